use clap::Args;
use std::path::PathBuf;

use crate::defaults;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Output database path
    #[arg(short, long, default_value = defaults::OUTPUT_DB)]
    pub output: PathBuf,

    /// Load the whole configuration from a JSON file
    ///
    /// Only `--seed` may be combined with it, to override the stored seed.
    #[arg(
        long,
        conflicts_with_all = [
            "nodes", "genotypes", "edge_probability", "selection_intensity",
            "generations", "fitness", "replacement", "connected", "no_stop_at_fixation",
        ]
    )]
    pub config: Option<PathBuf>,

    /// Number of nodes in the random graph
    #[arg(short = 'n', long, default_value_t = defaults::NODE_COUNT)]
    pub nodes: usize,

    /// Number of genotypes (at most 26, labelled A to Z)
    #[arg(short = 'k', long, default_value_t = defaults::GENOTYPE_COUNT)]
    pub genotypes: usize,

    /// Probability that any pair of nodes is joined by an edge
    #[arg(short = 'p', long, default_value_t = defaults::EDGE_PROBABILITY)]
    pub edge_probability: f64,

    /// Selection intensity w (0 = neutral drift, 1 = fitness equals payoff)
    #[arg(short = 'w', long, default_value_t = defaults::SELECTION_INTENSITY)]
    pub selection_intensity: f64,

    /// Maximum number of generations
    #[arg(short = 'g', long, default_value_t = defaults::GENERATIONS)]
    pub generations: usize,

    /// Payoff-to-fitness mapping (linear, exponential)
    #[arg(long, default_value = defaults::FITNESS)]
    pub fitness: String,

    /// Which neighbour the offspring replaces (uniform, inverse-fitness)
    #[arg(long, default_value = defaults::REPLACEMENT)]
    pub replacement: String,

    /// Resample the graph until it is connected
    #[arg(long)]
    pub connected: bool,

    /// Keep stepping after a genotype has taken every node
    #[arg(long)]
    pub no_stop_at_fixation: bool,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,
}
