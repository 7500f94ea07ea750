//! Write transactions with rollback on drop.

use crate::store::StoreResult;
use rusqlite::{Connection, Params};

/// A write transaction on the store's connection.
///
/// Opened with `BEGIN IMMEDIATE` so the write lock is taken up front; a
/// multi-statement operation either lands completely or not at all. Dropping
/// the value without calling [`Transaction::commit`] rolls everything back,
/// which is what happens when any statement inside returns early with `?`.
pub struct Transaction<'a> {
    conn: &'a Connection,
    committed: bool,
}

impl<'a> Transaction<'a> {
    /// Starts a write transaction on `conn`.
    pub(crate) fn begin(conn: &'a Connection) -> StoreResult<Self> {
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Self {
            conn,
            committed: false,
        })
    }

    /// Returns the connection the transaction runs on.
    pub(crate) fn conn(&self) -> &Connection {
        self.conn
    }

    /// Executes one statement inside the transaction.
    pub fn execute(&self, sql: &str, params: impl Params) -> StoreResult<usize> {
        Ok(self.conn.execute(sql, params)?)
    }

    /// Rowid of the last row inserted through this connection.
    pub fn last_insert_rowid(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    /// Commits the transaction.
    pub fn commit(mut self) -> StoreResult<()> {
        self.conn.execute_batch("COMMIT")?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            // Nothing useful to do with a failed rollback while unwinding
            let _ = self.conn.execute_batch("ROLLBACK");
        }
    }
}
