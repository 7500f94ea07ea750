//! Store traits and result types.

use crate::domain::{Backlink, LinkTarget, Note, NoteId, NoteLink, OpKind, PendingOp, Tag};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use thiserror::Error;

// ===========================================
// StoreError Type
// ===========================================

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A migration step failed or the on-disk schema is unknown.
    ///
    /// Fatal: the store must not be used until this is resolved.
    #[error("schema error at version {version}: {reason}")]
    Schema { version: i64, reason: String },

    /// The storage engine failed to execute a statement.
    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// A primary-key or uniqueness constraint was violated.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// A stored value could not be decoded.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// An I/O error occurred while preparing the store location.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Constraint(msg.clone().unwrap_or_else(|| e.to_string()))
            }
            rusqlite::Error::FromSqlConversionFailure(_, _, inner) => {
                StoreError::InvalidData(inner.to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::InvalidData(format!("note snapshot: {}", err))
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// ===========================================
// StoreStats
// ===========================================

/// Row counts across the store, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub schema_version: i64,
    pub active_notes: usize,
    pub deleted_notes: usize,
    pub tags: usize,
    pub links: usize,
    pub unresolved_links: usize,
    pub pending_ops: usize,
}

// ===========================================
// NoteRepository Trait
// ===========================================

/// Note storage: CRUD and listing queries over notes, tags and links.
///
/// Every write keeps the full-text index in step with the notes table inside
/// the same transaction; callers never touch the index.
pub trait NoteRepository {
    /// Inserts or replaces a note by id. The caller owns `updated_at`.
    fn upsert_note(&mut self, note: &Note) -> StoreResult<()>;

    /// Point lookup. Tombstoned notes are returned with `deleted` set.
    fn find_note(&self, id: &NoteId) -> StoreResult<Option<Note>>;

    /// All live notes, most recently updated first.
    fn all_notes(&self) -> StoreResult<Vec<Note>>;

    /// Live notes whose title starts with `query` or contains ` query`,
    /// alphabetical by title, at most `limit` rows.
    ///
    /// Matching is ASCII case-insensitive. An empty query returns the first
    /// `limit` notes of [`NoteRepository::all_notes`].
    fn suggest_notes_by_title_prefix(&self, query: &str, limit: usize) -> StoreResult<Vec<Note>>;

    /// Replaces the note's tag set with `tags`.
    fn replace_tags_for_note(&mut self, note_id: &NoteId, tags: &BTreeSet<Tag>)
    -> StoreResult<()>;

    /// Replaces the note's outgoing links with `targets`.
    ///
    /// Two targets with the same title are a constraint violation.
    fn replace_links_for_note(
        &mut self,
        note_id: &NoteId,
        targets: &[LinkTarget],
    ) -> StoreResult<()>;

    /// Tags used by at least one live note, case-insensitively sorted.
    fn distinct_tags(&self) -> StoreResult<Vec<Tag>>;

    /// Live notes carrying exactly `tag`, most recently updated first.
    fn notes_with_tag(&self, tag: &Tag) -> StoreResult<Vec<Note>>;

    /// Links pointing at `target_title`, each with its live source note.
    fn backlinks_with_sources(&self, target_title: &str) -> StoreResult<Vec<Backlink>>;

    /// Empties every table and the search index.
    fn clear_all(&mut self) -> StoreResult<()>;

    /// Ids of all live notes.
    fn local_active_note_ids(&self) -> StoreResult<HashSet<NoteId>>;

    /// Flags a live note deleted and stamps it with `at`.
    ///
    /// Returns false, changing nothing, if the note is absent or already deleted.
    fn soft_delete_note(&mut self, id: &NoteId, at: DateTime<Utc>) -> StoreResult<bool>;

    /// Physically removes a note with its tags and outgoing links.
    fn purge_note(&mut self, id: &NoteId) -> StoreResult<bool>;

    /// Tags on a note, sorted.
    fn tags_for_note(&self, id: &NoteId) -> StoreResult<Vec<Tag>>;

    /// Outgoing links of a note, sorted by target title.
    fn links_for_note(&self, id: &NoteId) -> StoreResult<Vec<NoteLink>>;

    /// Resolves unresolved links against live note titles.
    fn resolve_links(&mut self) -> StoreResult<usize>;
}

// ===========================================
// NoteSearch Trait
// ===========================================

/// Free-text search over live notes.
pub trait NoteSearch {
    /// Searches notes.
    ///
    /// - blank input returns [`NoteRepository::all_notes`]
    /// - `#needle` matches notes with a tag containing `needle`
    /// - anything else matches notes containing every whitespace-separated
    ///   term as a word prefix, falling back to a literal substring match
    ///   when the full-text index is unusable
    ///
    /// Results are most recently updated first.
    fn search_notes(&self, raw_query: &str) -> StoreResult<Vec<Note>>;
}

// ===========================================
// Outbox Trait
// ===========================================

/// Durable FIFO of local mutations awaiting delivery.
pub trait Outbox {
    /// Appends an op and returns its id. Ids strictly increase.
    fn enqueue(
        &mut self,
        entity_id: &NoteId,
        kind: OpKind,
        payload: Option<&str>,
    ) -> StoreResult<i64>;

    /// All pending ops in delivery order. Does not remove them.
    fn pending_ops(&self) -> StoreResult<Vec<PendingOp>>;

    /// Removes exactly the ops with the given ids. Returns how many existed.
    fn delete_pending_by_ids(&mut self, ids: &[i64]) -> StoreResult<usize>;

    /// Reads and removes every pending op in one transaction.
    ///
    /// The ops are gone once this returns; a caller whose push then fails
    /// must hand them to [`Outbox::requeue`] to keep at-least-once delivery.
    fn dequeue_all(&mut self) -> StoreResult<Vec<PendingOp>>;

    /// Puts previously dequeued ops back under their original ids.
    ///
    /// Ops enqueued since the dequeue have higher ids, so the restored ops
    /// replay first and the newest mutation of each entity still lands last.
    /// Fails with [`StoreError::Constraint`] if an id is still pending.
    fn requeue(&mut self, ops: &[PendingOp]) -> StoreResult<Vec<i64>>;

    /// Number of pending ops.
    fn pending_count(&self) -> StoreResult<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_displays_version() {
        let err = StoreError::Schema {
            version: 7,
            reason: "future schema".to_string(),
        };
        assert_eq!(err.to_string(), "schema error at version 7: future schema");
    }

    #[test]
    fn store_error_implements_std_error() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<StoreError>();
    }

    #[test]
    fn constraint_failures_are_classified() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (k TEXT PRIMARY KEY); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err: StoreError = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, StoreError::Constraint(_)), "got {:?}", err);
    }

    #[test]
    fn other_failures_are_database_errors() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err: StoreError = conn
            .execute("SELECT * FROM missing", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn snapshot_errors_are_invalid_data() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: StoreError = json_err.into();
        assert!(err.to_string().starts_with("invalid data: note snapshot"));
    }
}
