//! Connection management for SqliteStore.

use super::SqliteStore;
use super::transaction::Transaction;
use crate::store::schema;
use crate::store::{StoreError, StoreResult};
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use tracing::info;

/// Pragmas applied to every connection.
const CONNECTION_PRAGMAS: &str = "PRAGMA temp_store = MEMORY;
     PRAGMA busy_timeout = 5000;";

/// Extra pragmas for file-backed stores.
const FILE_PRAGMAS: &str = "PRAGMA journal_mode = WAL;
     PRAGMA synchronous = NORMAL;";

impl SqliteStore {
    // ===========================================
    // In-Memory Connection
    // ===========================================

    /// Opens an in-memory store with the current schema.
    ///
    /// Useful for tests and throwaway caches.
    pub fn open_in_memory() -> StoreResult<Self> {
        let mut conn = Connection::open_in_memory()?;
        conn.execute_batch(CONNECTION_PRAGMAS)?;
        schema::migrate(&mut conn)?;
        Ok(Self { conn })
    }

    // ===========================================
    // File-Based Connection
    // ===========================================

    /// Opens or creates a store at the given path.
    ///
    /// Creates parent directories if they don't exist, then migrates the
    /// schema forward. A schema error means the store must not be used.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut conn = Connection::open(path)?;
        conn.execute_batch(CONNECTION_PRAGMAS)?;
        conn.execute_batch(FILE_PRAGMAS)?;
        schema::migrate(&mut conn)?;
        info!(path = %path.display(), "opened local store");
        Ok(Self { conn })
    }

    // ===========================================
    // Connection Accessors
    // ===========================================

    /// Returns a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begins a write transaction that rolls back on drop unless committed.
    pub(crate) fn transaction(&mut self) -> StoreResult<Transaction<'_>> {
        Transaction::begin(&self.conn)
    }

    // ===========================================
    // Maintenance
    // ===========================================

    /// Returns the schema version recorded in the store.
    pub fn schema_version(&self) -> StoreResult<i64> {
        schema::schema_version(&self.conn)
    }

    /// Reseeds the full-text index from the notes table.
    pub fn rebuild_search_index(&mut self) -> StoreResult<()> {
        schema::rebuild_search_index(&mut self.conn)
    }
}
