use anyhow::{Context, Result};
use evographs_sim::evolution::{FitnessModel, ReplacementRule};
use evographs_sim::simulation::{Configuration, Simulation};
use evographs_sim::storage::Recorder;

use crate::args::InitArgs;
use crate::printing::print_simulation_parameters;

pub fn init_simulation(args: &InitArgs) -> Result<()> {
    let output = &args.output;

    println!("🕸  Evographs - Spatial Moran Process");
    println!("============================================\n");

    let config = build_config(args)?;
    let sim = Simulation::new(config).context("Failed to initialize simulation")?;

    println!("Configuration:");
    print_simulation_parameters(&sim);

    println!("Setting up database...");
    let rng_state = sim.rng_state_bytes()?;
    let initial = sim
        .history()
        .last()
        .context("Initial population was not captured")?;

    let mut recorder = Recorder::new(output, sim.config(), sim.graph().topology())
        .context("Failed to create recorder")?;
    recorder
        .record_generation(initial, Some(rng_state.as_slice()))
        .context("Failed to record initial generation")?;
    // A reused database file must not keep generations from an older run
    recorder
        .truncate_after(0)
        .context("Failed to clear previous generations")?;
    recorder.close().context("Failed to close recorder")?;

    println!("✓ Database created: {}", output.display());
    println!("\nSimulation initialized successfully!");
    println!("  Nodes: {}", sim.graph().node_count());
    println!("  Edges: {}", sim.graph().edge_count());
    println!("  Genotypes: {}", sim.config().genotype_count());
    println!("  Generations: {}", sim.config().execution.total_generations);
    if let Some(seed) = sim.config().execution.seed {
        println!("  Seed: {seed}");
    }
    println!(
        "\n💡 Use 'evographs run -d {}' to start the simulation",
        output.display()
    );

    Ok(())
}

pub fn build_config(args: &InitArgs) -> Result<Configuration> {
    let config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let mut config =
                Configuration::from_json(&json).context("Invalid configuration file")?;
            if args.seed.is_some() {
                config.execution.seed = args.seed;
            }
            config
        }
        None => {
            let mut config = Configuration::new(
                args.nodes,
                args.genotypes,
                args.edge_probability,
                args.selection_intensity,
                args.generations,
                args.seed,
            );
            config.graph.require_connected = args.connected;
            config.execution.stop_at_fixation = !args.no_stop_at_fixation;
            config.evolution.fitness = args
                .fitness
                .parse::<FitnessModel>()
                .map_err(|e| anyhow::anyhow!(e))
                .context("Invalid fitness model")?;
            config.evolution.replacement = args
                .replacement
                .parse::<ReplacementRule>()
                .map_err(|e| anyhow::anyhow!(e))
                .context("Invalid replacement rule")?;
            config
        }
    };

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
