//! Storage module for persisting simulation data.
//!
//! This module provides SQLite-based recording of topology, per-generation
//! genotype assignments and RNG checkpoints, allowing runs to be resumed and
//! replayed by an external renderer.

mod database;
mod query;
mod recorder;
pub mod types;

pub use database::{Database, DatabaseStats};
pub use query::QueryBuilder;
pub use recorder::{Recorder, RecorderStats};
pub use types::{CheckpointInfo, RecordingStrategy};
