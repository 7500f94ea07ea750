//! Local store: schema, SQLite implementation and the repository traits.

pub mod repository;
pub mod schema;
pub mod sqlite;

pub use repository::{NoteRepository, NoteSearch, Outbox, StoreError, StoreResult, StoreStats};
pub use schema::SCHEMA_VERSION;
pub use sqlite::SqliteStore;
