//! Evolutionary operators of the Moran update:
//! - **Fitness**: payoff aggregation and pluggable payoff-to-fitness mappings
//! - **Selection**: fitness-proportional birth and neighbour replacement

pub mod fitness;
pub mod selection;

pub use fitness::{expected_payoff, FitnessFunction, FitnessLandscape, FitnessModel};
pub use selection::{select_parent, ReplacementRule};
