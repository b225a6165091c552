use serde::{Deserialize, Serialize};

/// Recording strategy for when to persist simulation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordingStrategy {
    /// Record every N generations.
    EveryN(usize),

    /// Record at specific generations.
    Specific(Vec<usize>),

    /// Record all generations.
    All,

    /// No recording.
    None,
}

impl RecordingStrategy {
    /// Check if generation should be recorded
    pub fn should_record(&self, generation: usize) -> bool {
        match self {
            Self::EveryN(0) => false,
            Self::EveryN(n) => generation % n == 0,
            Self::Specific(gens) => gens.contains(&generation),
            Self::All => true,
            Self::None => false,
        }
    }
}

/// A stored RNG state from which a run can resume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointInfo {
    pub generation: usize,
    pub rng_state: Vec<u8>,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
}
