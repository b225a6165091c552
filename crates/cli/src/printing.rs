use evographs_sim::base::Genotype;
use evographs_sim::simulation::{Configuration, InitialDistribution, PayoffConfig, Simulation};

pub fn print_simulation_parameters(sim: &Simulation) {
    print_parameters(sim.config());
    println!(
        "  • Sampled Graph: {} edges, {}",
        sim.graph().edge_count(),
        if sim.graph().topology().is_connected() {
            "connected"
        } else {
            "not connected"
        }
    );
    println!();
}

pub fn print_parameters(config: &Configuration) {
    let exec = &config.execution;
    let graph = &config.graph;
    let evolution = &config.evolution;

    println!("\n📋 Simulation Configuration");
    println!(
        "  • Generations: {} [-g, --generations]",
        exec.total_generations
    );
    match exec.seed {
        Some(seed) => println!("  • Random Seed: {seed} [--seed]"),
        None => println!("  • Random Seed: Random [--seed]"),
    }
    println!(
        "  • Stop at Fixation: {} [--no-stop-at-fixation]",
        exec.stop_at_fixation
    );

    println!("\n🕸  Graph");
    println!("  • Nodes: {} [-n, --nodes]", graph.node_count);
    println!(
        "  • Edge Probability: {} [-p, --edge-probability]",
        graph.edge_probability
    );
    if graph.require_connected {
        println!(
            "  • Connected: required (up to {} attempts) [--connected]",
            graph.max_connect_attempts
        );
    }

    println!("\n🎯 Fitness & Selection");
    println!("  • Genotypes: {} [-k, --genotypes]", evolution.genotype_count);
    println!(
        "  • Selection Intensity: {} [-w, --selection-intensity]",
        evolution.selection_intensity
    );
    if evolution.selection_intensity == 0.0 {
        println!("  • Regime: Neutral Drift");
    }
    println!("  • Fitness Model: {} [--fitness]", evolution.fitness);
    println!("  • Replacement: {} [--replacement]", evolution.replacement);

    match &evolution.payoff {
        PayoffConfig::Random => println!("  • Payoff Matrix: random"),
        PayoffConfig::Explicit(matrix) => {
            println!("  • Payoff Matrix:");
            for (row, focal) in matrix.rows().iter().zip(Genotype::all(matrix.size())) {
                let cells: Vec<String> = row.iter().map(|v| format!("{v:.4}")).collect();
                println!("    {focal}: [{}]", cells.join(", "));
            }
        }
    }

    match &config.initialization {
        InitialDistribution::Uniform => println!("  • Initial Genotypes: uniform"),
        InitialDistribution::Proportions(weights) => {
            println!("  • Initial Genotypes: proportions {weights:?}")
        }
        InitialDistribution::Explicit(_) => println!("  • Initial Genotypes: explicit"),
    }
}

/// `A=3 B=5 ...` for the first `genotype_count` genotypes.
pub fn format_counts(counts: &[usize]) -> String {
    counts
        .iter()
        .zip(Genotype::all(counts.len()))
        .map(|(count, genotype)| format!("{genotype}={count}"))
        .collect::<Vec<_>>()
        .join(" ")
}
