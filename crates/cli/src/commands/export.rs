use anyhow::{Context, Result};
use evographs_sim::graph::PopulationSnapshot;
use evographs_sim::storage::QueryBuilder;
use serde_json::json;
use std::path::{Path, PathBuf};

pub fn export_data(
    database: &Path,
    generations: Option<&str>,
    format: &str,
    output: Option<&PathBuf>,
) -> Result<()> {
    if !database.exists() {
        anyhow::bail!("Database {} not found", database.display());
    }
    let query = QueryBuilder::new(database).context("Failed to open database")?;

    let recorded = query
        .get_recorded_generations()
        .context("Failed to get generations")?;
    let selected = select_generations(generations.unwrap_or("all"), &recorded)?;
    if selected.is_empty() {
        anyhow::bail!("No recorded generations match the selection");
    }

    let snapshots = selected
        .iter()
        .map(|&generation| {
            query
                .get_generation(generation)
                .with_context(|| format!("Failed to load generation {generation}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let content = match format {
        "csv" => to_csv(&snapshots),
        "json" => {
            let config = query.get_full_config().context("Failed to load configuration")?;
            let topology = query.get_topology().context("Failed to load topology")?;
            let frames: Vec<_> = snapshots
                .iter()
                .map(|snap| {
                    let genotypes: Vec<String> =
                        snap.genotypes().iter().map(|g| g.to_string()).collect();
                    json!({
                        "generation": snap.generation(),
                        "genotypes": genotypes,
                    })
                })
                .collect();
            let data = json!({
                "node_count": topology.node_count(),
                "genotype_count": config.genotype_count(),
                "edges": topology.edges(),
                "snapshots": frames,
            });
            serde_json::to_string_pretty(&data)?
        }
        _ => anyhow::bail!("Unknown format '{format}'. Use: csv or json"),
    };
    query.close().ok();

    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "✓ Exported {} generations to: {}",
                snapshots.len(),
                path.display()
            );
        }
        None => print!("{content}"),
    }

    Ok(())
}

fn to_csv(snapshots: &[PopulationSnapshot]) -> String {
    let mut content = String::from("generation,node,genotype\n");
    for snap in snapshots {
        for (node, genotype) in snap.genotypes().iter().enumerate() {
            content.push_str(&format!("{},{node},{genotype}\n", snap.generation()));
        }
    }
    content
}

/// Resolve `all`, `100`, `10,20` or `0..1000` (end exclusive) against the
/// recorded generations.
fn select_generations(spec: &str, recorded: &[usize]) -> Result<Vec<usize>> {
    let spec = spec.trim();
    if spec == "all" {
        return Ok(recorded.to_vec());
    }

    if let Some((start, end)) = spec.split_once("..") {
        let start: usize = if start.is_empty() {
            0
        } else {
            start.parse().context("Invalid range start")?
        };
        let end: usize = if end.is_empty() {
            usize::MAX
        } else {
            end.parse().context("Invalid range end")?
        };
        return Ok(recorded
            .iter()
            .copied()
            .filter(|g| (start..end).contains(g))
            .collect());
    }

    let mut selected = Vec::new();
    for part in spec.split(',') {
        let generation: usize = part
            .trim()
            .parse()
            .with_context(|| format!("Invalid generation '{part}'"))?;
        if recorded.binary_search(&generation).is_err() {
            anyhow::bail!("Generation {generation} was not recorded");
        }
        selected.push(generation);
    }
    Ok(selected)
}
