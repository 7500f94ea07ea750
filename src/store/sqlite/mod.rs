//! SQLite-backed local cache implementation.

mod connection;
mod notes;
mod outbox;
mod rows;
mod search;
mod transaction;


use rusqlite::Connection;

pub use transaction::Transaction;

// ===========================================
// SqliteStore Struct
// ===========================================

/// SQLite-backed local store for notes, relations and the outbox.
///
/// Construct one per process and hand it to the repository layer and the
/// sync driver. Writes take `&mut self`, so there is exactly one writer.
pub struct SqliteStore {
    pub(crate) conn: Connection,
}
