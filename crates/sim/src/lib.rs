//! # Simulation Crate
//!
//! The `sim` crate provides the core logic of the spatial Moran process: a
//! population on the nodes of an undirected graph where, each generation, one
//! individual reproduces proportionally to its frequency-dependent fitness and
//! its offspring replaces a neighbour.
//!
//! It includes modules for the graph structure, fitness and selection, the
//! simulation engine, and SQLite storage of runs.

pub mod base;
pub mod errors;
pub mod evolution;
pub mod graph;
pub mod prelude;
pub mod simulation;
pub mod storage;

pub use base::{Genotype, PayoffMatrix};
pub use graph::Graph;
