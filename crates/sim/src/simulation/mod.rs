//! Simulation engine and configuration.
//!
//! - `Simulation`: the Moran engine that owns graph, RNG and history and
//!   executes one birth/death event per generation.
//! - `Configuration`: the serialisable description of a run.
//! - `SimulationBuilder`: fluent builder for constructing `Simulation`
//!   instances with sensible defaults and validation.

pub mod builder;
pub mod configs;
pub mod engine;

pub use builder::SimulationBuilder;
pub use configs::{
    Configuration, EvolutionConfig, ExecutionConfig, GraphConfig, InitialDistribution,
    PayoffConfig,
};
pub use engine::{Simulation, SimulationState, StepEvent};
