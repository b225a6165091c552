use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn evographs() -> Command {
    Command::cargo_bin("evographs").unwrap()
}

fn init_small(db_path: &Path, extra: &[&str]) {
    evographs()
        .arg("init")
        .arg("--output")
        .arg(db_path)
        .args(["-n", "8", "-p", "1.0", "-g", "300", "--seed", "17"])
        .args(extra)
        .assert()
        .success();
}

#[test]
fn test_init_creates_database() {
    let temp = tempdir().unwrap();
    let db_path = temp.path().join("test_sim.db");

    evographs()
        .arg("init")
        .arg("--output")
        .arg(&db_path)
        .args(["-g", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Simulation initialized successfully!",
        ));

    assert!(db_path.exists());
}

#[test]
fn test_init_graph_params() {
    let temp = tempdir().unwrap();
    let db_path = temp.path().join("test_graph.db");

    evographs()
        .arg("init")
        .arg("--output")
        .arg(&db_path)
        .args(["--nodes", "10", "--edge-probability", "1.0", "--genotypes", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nodes: 10"))
        .stdout(predicate::str::contains("Edges: 45"))
        .stdout(predicate::str::contains("Genotypes: 3"));
}

#[test]
fn test_init_generations_param() {
    let temp = tempdir().unwrap();
    let db_path = temp.path().join("test_gen.db");

    evographs()
        .arg("init")
        .arg("--output")
        .arg(&db_path)
        .arg("--generations")
        .arg("50")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generations: 50"));
}

#[test]
fn test_init_rejects_invalid_probability() {
    let temp = tempdir().unwrap();
    let db_path = temp.path().join("test_bad_p.db");

    evographs()
        .arg("init")
        .arg("--output")
        .arg(&db_path)
        .args(["-p", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_init_rejects_unknown_fitness_model() {
    let temp = tempdir().unwrap();
    let db_path = temp.path().join("test_bad_fitness.db");

    evographs()
        .arg("init")
        .arg("--output")
        .arg(&db_path)
        .args(["--fitness", "quadratic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid fitness model"));
}

#[test]
fn test_init_config_conflicts_with_graph_flags() {
    let temp = tempdir().unwrap();
    let db_path = temp.path().join("test_conflict.db");

    evographs()
        .arg("init")
        .arg("--output")
        .arg(&db_path)
        .args(["--config", "whatever.json", "-n", "5"])
        .assert()
        .failure();
}

#[test]
fn test_init_from_config_file() {
    let temp = tempdir().unwrap();
    let db_path = temp.path().join("test_config.db");
    let config_path = temp.path().join("config.json");
    std::fs::write(
        &config_path,
        r#"{
            "execution": { "total_generations": 25, "seed": 4 },
            "graph": { "node_count": 6, "edge_probability": 1.0 },
            "evolution": {
                "genotype_count": 2,
                "selection_intensity": 0.2,
                "payoff": { "explicit": [[1.0, 0.0], [0.0, 1.0]] }
            }
        }"#,
    )
    .unwrap();

    evographs()
        .arg("init")
        .arg("--output")
        .arg(&db_path)
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Nodes: 6"))
        .stdout(predicate::str::contains("Generations: 25"))
        .stdout(predicate::str::contains("Seed: 4"));
}

#[test]
fn test_run_completes() {
    let temp = tempdir().unwrap();
    let db_path = temp.path().join("test_run.db");
    init_small(&db_path, &[]);

    evographs()
        .arg("run")
        .arg("--database")
        .arg(&db_path)
        .args(["--record-every", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Simulation complete!"))
        .stdout(predicate::str::contains("Final generation:"));
}

#[test]
fn test_run_without_init_fails() {
    let temp = tempdir().unwrap();
    let db_path = temp.path().join("missing.db");

    evographs()
        .arg("run")
        .arg("-d")
        .arg(&db_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("evographs init"));
    assert!(!db_path.exists());
}

#[test]
fn test_resume_after_completion() {
    let temp = tempdir().unwrap();
    let db_path = temp.path().join("test_resume.db");
    init_small(&db_path, &[]);

    evographs().arg("run").arg("-d").arg(&db_path).assert().success();
    evographs()
        .arg("run")
        .arg("-d")
        .arg(&db_path)
        .arg("--resume")
        .assert()
        .success()
        .stdout(predicate::str::contains("Simulation already complete!"));
}

#[test]
fn test_info_and_generations() {
    let temp = tempdir().unwrap();
    let db_path = temp.path().join("test_info.db");
    init_small(&db_path, &["--no-stop-at-fixation"]);

    evographs()
        .arg("run")
        .arg("-d")
        .arg(&db_path)
        .args(["--record-every", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Final generation: 300"));

    evographs()
        .arg("info")
        .arg("-d")
        .arg(&db_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Nodes: 8"))
        .stdout(predicate::str::contains("Edges: 28"))
        .stdout(predicate::str::contains("Recorded snapshots: 4"))
        .stdout(predicate::str::contains("\"node_count\": 8"));

    evographs()
        .arg("generations")
        .arg("-d")
        .arg(&db_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded Generations"))
        .stdout(predicate::str::contains("Total: 4 snapshots"));
}

#[test]
fn test_export_csv_and_json() {
    let temp = tempdir().unwrap();
    let db_path = temp.path().join("test_export.db");
    init_small(&db_path, &[]);

    evographs()
        .arg("export")
        .arg("-d")
        .arg(&db_path)
        .args(["-g", "0", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("generation,node,genotype\n0,0,"));

    let json_path = temp.path().join("history.json");
    evographs()
        .arg("export")
        .arg("-d")
        .arg(&db_path)
        .args(["-f", "json", "-o"])
        .arg(&json_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 generations"));

    let data: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(data["node_count"], 8);
    assert_eq!(data["edges"].as_array().unwrap().len(), 28);
    assert_eq!(data["snapshots"][0]["generation"], 0);
    assert_eq!(data["snapshots"][0]["genotypes"].as_array().unwrap().len(), 8);

    evographs()
        .arg("export")
        .arg("-d")
        .arg(&db_path)
        .args(["-f", "fasta"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown format"));
}

#[test]
fn test_seeded_runs_export_identically() {
    let temp = tempdir().unwrap();
    let mut exports = Vec::new();

    for name in ["a.db", "b.db"] {
        let db_path = temp.path().join(name);
        init_small(&db_path, &["--no-stop-at-fixation"]);
        evographs()
            .arg("run")
            .arg("-d")
            .arg(&db_path)
            .args(["--record-every", "50"])
            .assert()
            .success();

        let output = evographs()
            .arg("export")
            .arg("-d")
            .arg(&db_path)
            .output()
            .unwrap();
        assert!(output.status.success());
        exports.push(output.stdout);
    }

    assert_eq!(exports[0], exports[1]);
    assert!(!exports[0].is_empty());
}
