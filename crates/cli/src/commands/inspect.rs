use anyhow::{Context, Result};
use evographs_sim::storage::QueryBuilder;
use std::path::Path;

use crate::printing::format_counts;

fn open(database: &Path) -> Result<QueryBuilder> {
    if !database.exists() {
        anyhow::bail!("Database {} not found", database.display());
    }
    QueryBuilder::new(database).context("Failed to open database")
}

pub fn show_info(database: &Path) -> Result<()> {
    let query = open(database)?;
    let config = query
        .get_full_config()
        .context("Failed to get simulation info")?;
    let topology = query.get_topology().context("Failed to load topology")?;
    let generations = query
        .get_recorded_generations()
        .context("Failed to get generations")?;

    println!("\n📊 Simulation Information");
    println!("{}", "=".repeat(50));
    println!("Nodes: {}", topology.node_count());
    println!("Edges: {}", topology.edge_count());
    println!(
        "Connected: {}",
        if topology.is_connected() { "yes" } else { "no" }
    );
    println!("Genotypes: {}", config.genotype_count());
    println!("Generations: {}", config.execution.total_generations);
    println!("Recorded snapshots: {}", generations.len());

    if let Some(last) = query.get_metadata_value("final_generation")? {
        println!("Final generation: {last}");
    }
    match (
        query.get_metadata_value("fixation_generation")?,
        query.get_metadata_value("fixation_genotype")?,
    ) {
        (Some(generation), Some(genotype)) => {
            println!("Fixation: genotype {genotype} at generation {generation}")
        }
        _ => println!("Fixation: none recorded"),
    }

    println!("\nParameters:");
    println!("{}", config.to_json()?);

    query.close().ok();
    Ok(())
}

pub fn show_generations(database: &Path) -> Result<()> {
    let query = open(database)?;
    let config = query
        .get_full_config()
        .context("Failed to get simulation info")?;
    let generations = query
        .get_recorded_generations()
        .context("Failed to get generations")?;

    if generations.is_empty() {
        println!("No recorded generations found.");
        return Ok(());
    }

    println!("\n📈 Recorded Generations:");
    println!("{}", "=".repeat(50));
    for generation in &generations {
        let snapshot = query
            .get_generation(*generation)
            .with_context(|| format!("Failed to load generation {generation}"))?;
        let counts = snapshot.genotype_counts(config.genotype_count());
        println!("{generation:>10}  {}", format_counts(&counts));
    }
    println!("Total: {} snapshots", generations.len());

    query.close().ok();
    Ok(())
}
