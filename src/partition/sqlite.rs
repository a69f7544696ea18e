//! Partition probe backed by an SQLite catalogue.
//!
//! The catalogue holds one (possibly empty) table per exported partition,
//! named `<table>_<year>` like the partitions in the analytics store.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::probe::PartitionProbe;
use super::{partition_table_name, PartitionError, PartitionResult};
use crate::sql::dialect::helpers::quote_double;

/// Probes partition existence in an SQLite database.
pub struct SqlitePartitionProbe {
    conn: Mutex<Connection>,
}

impl SqlitePartitionProbe {
    /// Open the catalogue at `path`.
    pub fn open(path: impl AsRef<Path>) -> PartitionResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Opened partition catalogue");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory catalogue (for testing).
    pub fn open_in_memory() -> PartitionResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Register a partition by creating its table.
    pub fn register(&self, table: &str, year: i32) -> PartitionResult<()> {
        let name = partition_table_name(table, year);
        let conn = self.lock()?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (id INTEGER PRIMARY KEY)",
            quote_double(&name)
        ))?;
        Ok(())
    }

    fn lock(&self) -> PartitionResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PartitionError::Probe("partition catalogue lock poisoned".into()))
    }
}

impl PartitionProbe for SqlitePartitionProbe {
    fn existing_partitions(
        &self,
        table: &str,
        years: &BTreeSet<i32>,
    ) -> PartitionResult<BTreeSet<i32>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare_cached("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1")?;

        let mut existing = BTreeSet::new();
        for &year in years {
            let found: Option<String> = stmt
                .query_row(params![partition_table_name(table, year)], |row| row.get(0))
                .optional()?;
            if found.is_some() {
                existing.insert(year);
            }
        }
        Ok(existing)
    }
}
