//! Base types for the spatial Moran model.
//!
//! This module provides the foundational value types shared by the graph,
//! the fitness functions and the engine: genotype labels, fitness values and
//! payoff matrices.

pub mod fitness;
mod genotype;
mod payoff;

pub use fitness::FitnessValue;
pub use genotype::Genotype;
pub use payoff::PayoffMatrix;
