//! Low-level database operations and schema management.

pub use crate::errors::DatabaseError;
use rusqlite::{Connection, Transaction};
use std::path::Path;
use tracing::warn;

/// Database connection wrapper with schema management.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    db_path: String,
}

impl Database {
    /// Open (or create) a database at the specified path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let conn =
            Connection::open(&path_str).map_err(|e| DatabaseError::Connection(e.to_string()))?;

        conn.execute_batch(
            "PRAGMA synchronous = NORMAL;
             PRAGMA journal_mode = WAL;
             PRAGMA temp_store = MEMORY;",
        )
        .map_err(|e| DatabaseError::Initialization(e.to_string()))?;

        let mut db = Self {
            conn,
            db_path: path_str,
        };

        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize database schema.
    fn initialize_schema(&mut self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "-- Metadata table (Configuration items)
                CREATE TABLE IF NOT EXISTS metadata (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                -- Undirected edges, node_a < node_b
                CREATE TABLE IF NOT EXISTS topology (
                    node_a INTEGER NOT NULL,
                    node_b INTEGER NOT NULL,
                    PRIMARY KEY (node_a, node_b)
                );

                -- Genotype of every node, one row per node per recorded generation
                CREATE TABLE IF NOT EXISTS state (
                    generation INTEGER NOT NULL,
                    node_id INTEGER NOT NULL,
                    genotype INTEGER NOT NULL,
                    PRIMARY KEY (generation, node_id)
                );

                -- Checkpoints for resumability (RNG state)
                CREATE TABLE IF NOT EXISTS checkpoints (
                    generation INTEGER PRIMARY KEY,
                    rng_state BLOB NOT NULL,
                    timestamp INTEGER NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_state_gen ON state(generation);",
            )
            .map_err(|e| DatabaseError::Initialization(e.to_string()))?;

        Ok(())
    }

    /// Begin a transaction for batched operations.
    pub fn transaction(&mut self) -> Result<Transaction<'_>, DatabaseError> {
        self.conn
            .transaction()
            .map_err(|e| DatabaseError::Transaction(e.to_string()))
    }

    /// Get reference to underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Get database path.
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Close the database and clean up WAL files.
    pub fn close(self) -> Result<(), DatabaseError> {
        if let Err(e) = self.conn.execute_batch(
            "PRAGMA wal_checkpoint(TRUNCATE);
             PRAGMA journal_mode = DELETE;",
        ) {
            warn!("failed to checkpoint/truncate WAL: {e}");
        }

        self.conn
            .close()
            .map_err(|(_conn, e)| DatabaseError::Close(e.to_string()))?;

        for suffix in &["-wal", "-shm"] {
            let fname = format!("{}{}", self.db_path, suffix);
            if let Err(e) = std::fs::remove_file(&fname) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("failed to remove {fname}: {e}");
                }
            }
        }

        Ok(())
    }

    /// Get database statistics.
    pub fn stats(&self) -> Result<DatabaseStats, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut tables = Vec::new();
        for row in rows {
            tables.push(row.map_err(|e| DatabaseError::Query(e.to_string()))?);
        }

        let count = |sql: &str| -> Result<usize, DatabaseError> {
            self.conn
                .query_row(sql, [], |row| row.get::<_, i64>(0))
                .map(|n| n as usize)
                .map_err(|e| DatabaseError::Query(e.to_string()))
        };

        Ok(DatabaseStats {
            state_records: count("SELECT COUNT(*) FROM state")?,
            recorded_generations: count("SELECT COUNT(DISTINCT generation) FROM state")?,
            checkpoints: count("SELECT COUNT(*) FROM checkpoints")?,
            edges: count("SELECT COUNT(*) FROM topology")?,
            tables,
        })
    }
}

/// Database statistics.
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub state_records: usize,
    pub recorded_generations: usize,
    pub checkpoints: usize,
    pub edges: usize,
    pub tables: Vec<String>,
}
