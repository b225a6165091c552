//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use evographs_sim::prelude::*;
//!
//! let mut sim = SimulationBuilder::new()
//!     .node_count(10)
//!     .edge_probability(1.0)
//!     .generations(100)
//!     .seed(1)
//!     .build()
//!     .unwrap();
//! sim.run().unwrap();
//! assert!(sim.generation() <= 100);
//! ```

pub use crate::base::{FitnessValue, Genotype, PayoffMatrix};
pub use crate::errors::{DatabaseError, GraphError, SimulationError};
pub use crate::evolution::{FitnessFunction, FitnessModel, ReplacementRule};
pub use crate::graph::{Graph, History, PopulationSnapshot, Topology};
pub use crate::simulation::{Configuration, Simulation, SimulationBuilder};
