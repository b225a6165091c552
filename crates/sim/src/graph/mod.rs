//! Graph structure for the spatial Moran model.
//!
//! - `Topology`: immutable undirected adjacency, shared by reference count.
//! - `Graph`: a topology plus one genotype label per node.
//! - `PopulationSnapshot` / `History`: per-generation records for playback.

mod snapshot;
mod structure;
mod topology;

pub use snapshot::{History, PopulationSnapshot};
pub use structure::Graph;
pub use topology::{Topology, DEFAULT_MAX_ATTEMPTS};
