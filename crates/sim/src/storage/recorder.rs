//! Synchronous recorder writing topology, snapshots and checkpoints.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::params;
use tracing::debug;

use crate::errors::DatabaseError;
use crate::graph::{PopulationSnapshot, Topology};
use crate::simulation::Configuration;
use crate::storage::Database;

/// Statistics about what a recorder has written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecorderStats {
    /// Generations written.
    pub generations_recorded: usize,
    /// Checkpoints written.
    pub checkpoints_recorded: usize,
    /// Rows written to the `state` table.
    pub state_rows: usize,
}

/// Writes one run into a database.
#[derive(Debug)]
pub struct Recorder {
    db: Database,
    node_count: usize,
    stats: RecorderStats,
}

impl Recorder {
    /// Open `db_path` and store the run's configuration and topology.
    ///
    /// Metadata is overwritten and the topology table replaced, so calling
    /// this again on the same run is harmless.
    pub fn new(
        db_path: impl AsRef<Path>,
        config: &Configuration,
        topology: &Topology,
    ) -> Result<Self, DatabaseError> {
        let mut db = Database::open(db_path)?;

        let full_config = serde_json::to_string(config)
            .map_err(|e| DatabaseError::Insert(format!("failed to serialize config: {e}")))?;
        let exec = &config.execution;
        let evolution = &config.evolution;
        let meta_pairs = [
            ("node_count", config.node_count().to_string()),
            ("edge_count", topology.edge_count().to_string()),
            ("genotype_count", evolution.genotype_count.to_string()),
            ("edge_probability", config.graph.edge_probability.to_string()),
            (
                "selection_intensity",
                evolution.selection_intensity.to_string(),
            ),
            ("total_generations", exec.total_generations.to_string()),
            (
                "seed",
                exec.seed
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "None".to_string()),
            ),
            ("fitness", evolution.fitness.to_string()),
            ("replacement", evolution.replacement.to_string()),
            ("full_config_json", full_config),
            ("created_at", now().to_string()),
        ];

        let tx = db.transaction()?;
        {
            let mut stmt = tx
                .prepare("INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)")
                .map_err(|e| DatabaseError::Insert(e.to_string()))?;
            for (k, v) in meta_pairs {
                stmt.execute(params![k, v])
                    .map_err(|e| DatabaseError::Insert(e.to_string()))?;
            }

            tx.execute("DELETE FROM topology", [])
                .map_err(|e| DatabaseError::Insert(e.to_string()))?;
            let mut stmt = tx
                .prepare("INSERT INTO topology (node_a, node_b) VALUES (?1, ?2)")
                .map_err(|e| DatabaseError::Insert(e.to_string()))?;
            for (u, v) in topology.edges() {
                stmt.execute(params![u as i64, v as i64])
                    .map_err(|e| DatabaseError::Insert(e.to_string()))?;
            }
        }
        tx.commit()
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;

        Ok(Self {
            db,
            node_count: topology.node_count(),
            stats: RecorderStats::default(),
        })
    }

    /// Write one generation, with a checkpoint when `rng_state` is given.
    ///
    /// Re-recording a generation replaces it.
    pub fn record_generation(
        &mut self,
        snapshot: &PopulationSnapshot,
        rng_state: Option<&[u8]>,
    ) -> Result<(), DatabaseError> {
        if snapshot.node_count() != self.node_count {
            return Err(DatabaseError::Insert(format!(
                "snapshot has {} nodes, recorded topology has {}",
                snapshot.node_count(),
                self.node_count
            )));
        }

        let generation = snapshot.generation() as i64;
        let tx = self.db.transaction()?;
        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT OR REPLACE INTO state (generation, node_id, genotype)
                     VALUES (?1, ?2, ?3)",
                )
                .map_err(|e| DatabaseError::Insert(e.to_string()))?;
            for (node, genotype) in snapshot.genotypes().iter().enumerate() {
                stmt.execute(params![generation, node as i64, genotype.index() as i64])
                    .map_err(|e| DatabaseError::Insert(e.to_string()))?;
            }

            if let Some(rng) = rng_state {
                tx.execute(
                    "INSERT OR REPLACE INTO checkpoints (generation, rng_state, timestamp)
                     VALUES (?1, ?2, ?3)",
                    params![generation, rng, now()],
                )
                .map_err(|e| DatabaseError::Insert(e.to_string()))?;
            }
        }
        tx.commit()
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;

        self.stats.generations_recorded += 1;
        self.stats.state_rows += snapshot.node_count();
        if rng_state.is_some() {
            self.stats.checkpoints_recorded += 1;
        }
        debug!(
            generation = snapshot.generation(),
            checkpoint = rng_state.is_some(),
            "recorded generation"
        );
        Ok(())
    }

    /// Remove every generation and checkpoint after `generation`.
    ///
    /// Used before re-running from an earlier state so the stored history
    /// stays consistent.
    pub fn truncate_after(&mut self, generation: usize) -> Result<(), DatabaseError> {
        let generation = generation as i64;
        let tx = self.db.transaction()?;
        tx.execute("DELETE FROM state WHERE generation > ?1", params![generation])
            .map_err(|e| DatabaseError::Insert(e.to_string()))?;
        tx.execute(
            "DELETE FROM checkpoints WHERE generation > ?1",
            params![generation],
        )
        .map_err(|e| DatabaseError::Insert(e.to_string()))?;
        tx.execute(
            "DELETE FROM metadata WHERE key IN ('fixation_generation', 'fixation_genotype')",
            [],
        )
        .map_err(|e| DatabaseError::Insert(e.to_string()))?;
        tx.commit()
            .map_err(|e| DatabaseError::Transaction(e.to_string()))
    }

    /// Store an additional metadata entry.
    pub fn set_metadata(&mut self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.db
            .connection()
            .execute(
                "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|e| DatabaseError::Insert(e.to_string()))?;
        Ok(())
    }

    pub fn stats(&self) -> RecorderStats {
        self.stats
    }

    /// Flush and close the database.
    pub fn close(self) -> Result<RecorderStats, DatabaseError> {
        let stats = self.stats;
        self.db.close()?;
        Ok(stats)
    }
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Genotype;

    fn g(i: usize) -> Genotype {
        Genotype::from_index(i).unwrap()
    }

    #[test]
    fn test_recorder_writes_generations() {
        let path = "/tmp/test_evographs_recorder.sqlite";
        let _ = std::fs::remove_file(path);

        let config = Configuration::new(3, 2, 1.0, 0.5, 10, Some(1));
        let topology = Topology::complete(3);
        let mut recorder = Recorder::new(path, &config, &topology).unwrap();

        recorder
            .record_generation(&PopulationSnapshot::new(0, vec![g(0), g(1), g(0)]), Some(&[7u8][..]))
            .unwrap();
        recorder
            .record_generation(&PopulationSnapshot::new(1, vec![g(0), g(0), g(0)]), None)
            .unwrap();
        assert!(recorder
            .record_generation(&PopulationSnapshot::new(2, vec![g(0)]), None)
            .is_err());

        let stats = recorder.close().unwrap();
        assert_eq!(stats.generations_recorded, 2);
        assert_eq!(stats.checkpoints_recorded, 1);
        assert_eq!(stats.state_rows, 6);

        let db = Database::open(path).unwrap();
        let db_stats = db.stats().unwrap();
        assert_eq!(db_stats.state_records, 6);
        assert_eq!(db_stats.recorded_generations, 2);
        assert_eq!(db_stats.checkpoints, 1);
        assert_eq!(db_stats.edges, 3);
        db.close().unwrap();
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_truncate_after() {
        let path = "/tmp/test_evographs_truncate.sqlite";
        let _ = std::fs::remove_file(path);

        let config = Configuration::new(2, 2, 1.0, 0.5, 10, Some(1));
        let topology = Topology::complete(2);
        let mut recorder = Recorder::new(path, &config, &topology).unwrap();
        for generation in 0..5 {
            recorder
                .record_generation(
                    &PopulationSnapshot::new(generation, vec![g(0), g(1)]),
                    Some(&[generation as u8][..]),
                )
                .unwrap();
        }
        recorder.truncate_after(2).unwrap();
        recorder.close().unwrap();

        let db = Database::open(path).unwrap();
        let stats = db.stats().unwrap();
        assert_eq!(stats.recorded_generations, 3);
        assert_eq!(stats.checkpoints, 3);
        db.close().unwrap();
        std::fs::remove_file(path).ok();
    }
}
