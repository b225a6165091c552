use anyhow::{Context, Result};
use evographs_sim::simulation::Simulation;
use evographs_sim::storage::{Recorder, RecordingStrategy};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::info;

use crate::printing::{format_counts, print_simulation_parameters};

pub fn run_simulation(
    database: &Path,
    resume: bool,
    record_every: usize,
    show_progress: bool,
) -> Result<()> {
    println!("🕸  Evographs - Running Simulation");
    println!("============================================\n");

    if !database.exists() {
        anyhow::bail!(
            "Database {} not found. Did you run 'evographs init' first?",
            database.display()
        );
    }

    let mut sim = if resume {
        println!("📂 Resuming simulation from checkpoint...");
        Simulation::from_checkpoint(database, None).context("Failed to resume")?
    } else {
        Simulation::from_checkpoint(database, Some(0))
            .context("Failed to load initial population. Did you run 'evographs init' first?")?
    };

    let start_generation = sim.generation();
    let total_generations = sim.config().execution.total_generations;
    if resume {
        println!("✓ Loaded checkpoint from generation {start_generation}");
    }

    // Re-running from an earlier state replaces everything recorded after it
    let mut recorder = Recorder::new(database, sim.config(), sim.graph().topology())
        .context("Failed to create recorder")?;
    recorder
        .truncate_after(start_generation)
        .context("Failed to clear later generations")?;

    println!("Configuration:");
    print_simulation_parameters(&sim);

    if sim.is_complete() {
        println!("✓ Simulation already complete!");
    } else {
        println!(
            "Running up to {} generations...",
            total_generations - start_generation
        );
    }

    let pb = if show_progress {
        let pb = ProgressBar::new(total_generations as u64);
        pb.set_position(start_generation as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {per_sec}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let strategy = RecordingStrategy::EveryN(record_every);
    let mut last_recorded = start_generation;

    while !sim.is_complete() {
        let event = sim.step()?;
        let generation = event.generation;

        if strategy.should_record(generation) {
            record_current(&sim, &mut recorder)
                .with_context(|| format!("Failed to record generation {generation}"))?;
            last_recorded = generation;
        }

        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    // The final state is always checkpointed so `--resume` and `export` see it
    let final_generation = sim.generation();
    if last_recorded != final_generation {
        record_current(&sim, &mut recorder)
            .with_context(|| format!("Failed to record generation {final_generation}"))?;
    }

    recorder.set_metadata("final_generation", &final_generation.to_string())?;
    if let Some((generation, genotype)) = sim.fixation() {
        recorder.set_metadata("fixation_generation", &generation.to_string())?;
        recorder.set_metadata("fixation_genotype", &genotype.to_string())?;
    }
    let stats = recorder.close().context("Failed to close recorder")?;
    info!(
        generation = final_generation,
        recorded = stats.generations_recorded,
        "run finished"
    );

    let counts = sim.graph().genotype_counts(sim.config().genotype_count());
    println!("\n✓ Simulation complete!");
    println!("  Final generation: {final_generation}");
    println!("  Genotype counts: {}", format_counts(&counts));
    match sim.fixation() {
        Some((generation, genotype)) => {
            println!("  Fixation: genotype {genotype} at generation {generation}")
        }
        None => println!("  Fixation: none"),
    }
    println!(
        "  Recorded {} generations, {} checkpoints",
        stats.generations_recorded, stats.checkpoints_recorded
    );

    println!(
        "\n💡 Use 'evographs info -d {}' to view results",
        database.display()
    );

    Ok(())
}

fn record_current(sim: &Simulation, recorder: &mut Recorder) -> Result<()> {
    let rng_state = sim.rng_state_bytes()?;
    let snapshot = sim
        .history()
        .last()
        .context("Simulation history is empty")?;
    recorder.record_generation(snapshot, Some(rng_state.as_slice()))?;
    Ok(())
}
