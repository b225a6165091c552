//! Query interface for reading back recorded runs.

use std::collections::HashMap;
use std::sync::Arc;

use rusqlite::{params, OptionalExtension};

use crate::base::Genotype;
use crate::errors::DatabaseError;
use crate::graph::{History, PopulationSnapshot, Topology};
use crate::simulation::Configuration;
use crate::storage::{CheckpointInfo, Database};

/// Query builder for recorded simulation data.
pub struct QueryBuilder {
    db: Database,
}

impl QueryBuilder {
    /// Open a database for querying.
    pub fn new(db_path: impl AsRef<std::path::Path>) -> Result<Self, DatabaseError> {
        let db = Database::open(db_path)?;
        Ok(Self { db })
    }

    /// Get raw metadata value by key.
    pub fn get_metadata_value(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare("SELECT value FROM metadata WHERE key = ?1")
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        stmt.query_row(params![key], |row| row.get(0))
            .optional()
            .map_err(|e| DatabaseError::Query(e.to_string()))
    }

    /// Get all metadata as a map.
    pub fn get_metadata(&self) -> Result<HashMap<String, String>, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare("SELECT key, value FROM metadata")
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut meta = HashMap::new();
        for row in rows {
            let (k, v): (String, String) = row.map_err(|e| DatabaseError::Query(e.to_string()))?;
            meta.insert(k, v);
        }
        Ok(meta)
    }

    /// Get complete simulation configuration from database.
    pub fn get_full_config(&self) -> Result<Configuration, DatabaseError> {
        let json = self
            .get_metadata_value("full_config_json")?
            .ok_or_else(|| DatabaseError::NotFound("full_config_json in metadata".into()))?;

        serde_json::from_str(&json)
            .map_err(|e| DatabaseError::Decode(format!("failed to parse config: {e}")))
    }

    /// Rebuild the recorded topology.
    pub fn get_topology(&self) -> Result<Topology, DatabaseError> {
        let node_count: usize = self
            .get_metadata_value("node_count")?
            .ok_or_else(|| DatabaseError::NotFound("node_count in metadata".into()))?
            .parse()
            .map_err(|e| DatabaseError::Decode(format!("invalid node_count: {e}")))?;

        let mut stmt = self
            .db
            .connection()
            .prepare("SELECT node_a, node_b FROM topology ORDER BY node_a, node_b")
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)? as usize, row.get::<_, i64>(1)? as usize))
            })
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut edges = Vec::new();
        for row in rows {
            edges.push(row.map_err(|e| DatabaseError::Query(e.to_string()))?);
        }

        Topology::from_edges(node_count, &edges)
            .map_err(|e| DatabaseError::Decode(format!("invalid stored topology: {e}")))
    }

    /// Genotype assignment recorded at `generation`.
    pub fn get_generation(&self, generation: usize) -> Result<PopulationSnapshot, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare(
                "SELECT node_id, genotype FROM state
                 WHERE generation = ?1
                 ORDER BY node_id",
            )
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let rows = stmt
            .query_map(params![generation as i64], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
            })
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut genotypes = Vec::new();
        for row in rows {
            let (node, genotype) = row.map_err(|e| DatabaseError::Query(e.to_string()))?;
            if node != genotypes.len() as i64 {
                return Err(DatabaseError::Decode(format!(
                    "generation {generation} is missing node {}",
                    genotypes.len()
                )));
            }
            let genotype = usize::try_from(genotype)
                .ok()
                .and_then(Genotype::from_index)
                .ok_or_else(|| {
                    DatabaseError::Decode(format!("invalid genotype {genotype} at node {node}"))
                })?;
            genotypes.push(genotype);
        }

        if genotypes.is_empty() {
            return Err(DatabaseError::NotFound(format!("generation {generation}")));
        }
        Ok(PopulationSnapshot::new(generation, genotypes))
    }

    /// Get all recorded generations.
    pub fn get_recorded_generations(&self) -> Result<Vec<usize>, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare("SELECT DISTINCT generation FROM state ORDER BY generation")
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, i64>(0))
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut gens = Vec::new();
        for row in rows {
            gens.push(row.map_err(|e| DatabaseError::Query(e.to_string()))? as usize);
        }
        Ok(gens)
    }

    /// Every recorded generation, as a history over the stored topology.
    pub fn get_history(&self) -> Result<History, DatabaseError> {
        let config = self.get_full_config()?;
        let topology = Arc::new(self.get_topology()?);
        let snapshots = self
            .get_recorded_generations()?
            .into_iter()
            .map(|generation| self.get_generation(generation))
            .collect::<Result<Vec<_>, _>>()?;

        History::from_snapshots(topology, config.genotype_count(), snapshots)
            .map_err(|e| DatabaseError::Decode(format!("inconsistent history: {e}")))
    }

    /// Get the latest checkpoint for current DB.
    pub fn get_latest_checkpoint(&self) -> Result<CheckpointInfo, DatabaseError> {
        self.query_checkpoint(
            "SELECT generation, rng_state, timestamp
             FROM checkpoints
             ORDER BY generation DESC
             LIMIT 1",
            None,
        )?
        .ok_or_else(|| DatabaseError::NotFound("no checkpoint recorded".into()))
    }

    /// Get the checkpoint recorded at `generation`.
    pub fn get_checkpoint(&self, generation: usize) -> Result<CheckpointInfo, DatabaseError> {
        self.query_checkpoint(
            "SELECT generation, rng_state, timestamp
             FROM checkpoints
             WHERE generation = ?1",
            Some(generation),
        )?
        .ok_or_else(|| DatabaseError::NotFound(format!("checkpoint at generation {generation}")))
    }

    fn query_checkpoint(
        &self,
        sql: &str,
        generation: Option<usize>,
    ) -> Result<Option<CheckpointInfo>, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare(sql)
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<CheckpointInfo> {
            Ok(CheckpointInfo {
                generation: row.get::<_, i64>(0)? as usize,
                rng_state: row.get(1)?,
                timestamp: row.get(2)?,
            })
        };
        let result = match generation {
            Some(g) => stmt.query_row(params![g as i64], map_row),
            None => stmt.query_row([], map_row),
        };
        result
            .optional()
            .map_err(|e| DatabaseError::Query(e.to_string()))
    }

    /// Close the query builder.
    pub fn close(self) -> Result<(), DatabaseError> {
        self.db.close()
    }
}
