use evographs_sim::base::Genotype;
use evographs_sim::graph::{Graph, PopulationSnapshot};
use evographs_sim::simulation::SimulationBuilder;
use evographs_sim::storage::{Database, QueryBuilder, Recorder};

#[test]
fn test_full_history_survives_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.sqlite");

    let mut sim = SimulationBuilder::new()
        .node_count(12)
        .edge_probability(0.4)
        .genotypes(3)
        .generations(40)
        .stop_at_fixation(false)
        .seed(5)
        .build()
        .unwrap();
    sim.run().unwrap();

    let mut recorder = Recorder::new(&path, sim.config(), sim.graph().topology()).unwrap();
    for snapshot in sim.history().iter() {
        recorder.record_generation(snapshot, None).unwrap();
    }
    let stats = recorder.close().unwrap();
    assert_eq!(stats.generations_recorded, 41);
    assert_eq!(stats.state_rows, 41 * 12);
    assert_eq!(stats.checkpoints_recorded, 0);

    let query = QueryBuilder::new(&path).unwrap();
    assert_eq!(query.get_full_config().unwrap(), *sim.config());
    assert_eq!(query.get_topology().unwrap(), **sim.graph().topology());
    assert_eq!(&query.get_history().unwrap(), sim.history());
    query.close().unwrap();

    let db = Database::open(&path).unwrap();
    let db_stats = db.stats().unwrap();
    assert_eq!(db_stats.edges, sim.graph().edge_count());
    assert_eq!(db_stats.recorded_generations, 41);
    db.close().unwrap();
}

#[test]
fn test_snapshot_restores_assignment_on_same_topology() {
    let mut sim = SimulationBuilder::new()
        .node_count(10)
        .edge_probability(0.3)
        .genotypes(2)
        .generations(25)
        .stop_at_fixation(false)
        .seed(8)
        .build()
        .unwrap();
    sim.run_for(10).unwrap();
    let snapshot = sim.history().get(5).unwrap().clone();
    sim.run().unwrap();

    let mut graph = Graph::new(sim.graph().topology().clone());
    snapshot.apply_to(&mut graph).unwrap();
    assert_eq!(graph.genotypes(), snapshot.genotypes());
    assert_eq!(graph.topology(), sim.graph().topology());

    let restored = snapshot.to_graph(sim.graph().topology().clone()).unwrap();
    assert_eq!(restored, graph);

    let wrong_size = PopulationSnapshot::new(0, vec![Genotype::from_index(0).unwrap(); 3]);
    assert!(wrong_size.apply_to(&mut graph).is_err());
}
