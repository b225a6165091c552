//! Shared default values for the command-line front end.

pub const OUTPUT_DB: &str = "evographs.db";

pub const NODE_COUNT: usize = 50;
pub const GENOTYPE_COUNT: usize = 2;
pub const EDGE_PROBABILITY: f64 = 0.1;
pub const SELECTION_INTENSITY: f64 = 0.5;
pub const GENERATIONS: usize = 1_000_000;

pub const FITNESS: &str = "linear";
pub const REPLACEMENT: &str = "uniform";

pub const RECORD_EVERY: usize = 100;
