//! Query engine: tag filter, full-text search and the substring fallback.

use super::SqliteStore;
use super::rows::{NOTE_COLUMNS, note_from_row};
use crate::domain::Note;
use crate::store::{NoteRepository, NoteSearch, StoreResult};
use rusqlite::ErrorCode;
use tracing::warn;

/// Result of asking the full-text index for matches.
#[derive(Debug)]
pub(super) enum IndexOutcome {
    /// The index answered.
    Hits(Vec<Note>),
    /// The index could not answer the query; the caller should fall back.
    Unavailable(rusqlite::Error),
}

/// Escapes LIKE metacharacters so they match literally under `ESCAPE '\'`.
pub(super) fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Builds an FTS5 expression requiring every term as a word prefix.
///
/// Each term is emitted as a quoted string so operators and punctuation in
/// user input are never parsed as query syntax.
pub(super) fn match_all_prefixes(query: &str) -> String {
    query
        .split_whitespace()
        .map(|term| format!("\"{}\"*", term.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether an engine error means the index itself is unusable.
fn is_index_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, msg) => {
            if e.code == ErrorCode::DatabaseCorrupt {
                return true;
            }
            let msg = msg.as_deref().unwrap_or_default();
            msg.contains("fts5")
                || msg.contains("syntax")
                || msg.contains("no such table")
                || msg.contains("malformed")
        }
        _ => false,
    }
}

impl SqliteStore {
    fn search_by_tag(&self, needle: &str) -> StoreResult<Vec<Note>> {
        let pattern = format!("%{}%", escape_like(needle));
        self.query_notes(
            &format!(
                "SELECT {} FROM notes n
                 WHERE n.deleted = 0
                   AND n.id IN (
                     SELECT t.note_id FROM note_tags t
                     WHERE t.tag LIKE ?1 ESCAPE '\\'
                   )
                 ORDER BY n.updated_at DESC, n.id",
                NOTE_COLUMNS
            ),
            [pattern],
        )
    }

    /// Runs the query against the full-text index.
    ///
    /// Index failures come back as [`IndexOutcome::Unavailable`]; any other
    /// engine error is returned as `Err`.
    pub(super) fn search_index(&self, query: &str) -> StoreResult<IndexOutcome> {
        let expression = match_all_prefixes(query);
        let attempt = (|| -> rusqlite::Result<Vec<Note>> {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {} FROM notes_fts f
                 JOIN notes n ON n.id = f.id
                 WHERE notes_fts MATCH ?1 AND n.deleted = 0
                 ORDER BY n.updated_at DESC, n.id",
                NOTE_COLUMNS
            ))?;
            stmt.query_map([&expression], |row| note_from_row(row, 0))?
                .collect()
        })();

        match attempt {
            Ok(notes) => Ok(IndexOutcome::Hits(notes)),
            Err(e) if is_index_error(&e) => Ok(IndexOutcome::Unavailable(e)),
            Err(e) => Err(e.into()),
        }
    }

    fn search_substring(&self, query: &str) -> StoreResult<Vec<Note>> {
        let pattern = format!("%{}%", escape_like(query));
        self.query_notes(
            &format!(
                "SELECT {} FROM notes n
                 WHERE n.deleted = 0
                   AND (n.title LIKE ?1 ESCAPE '\\' OR n.body LIKE ?1 ESCAPE '\\')
                 ORDER BY n.updated_at DESC, n.id",
                NOTE_COLUMNS
            ),
            [pattern],
        )
    }
}

impl NoteSearch for SqliteStore {
    fn search_notes(&self, raw_query: &str) -> StoreResult<Vec<Note>> {
        let query = raw_query.trim();
        if query.is_empty() {
            return self.all_notes();
        }

        if let Some(needle) = query.strip_prefix('#') {
            let needle = needle.trim();
            if needle.is_empty() {
                return self.all_notes();
            }
            return self.search_by_tag(needle);
        }

        match self.search_index(query)? {
            IndexOutcome::Hits(notes) => Ok(notes),
            IndexOutcome::Unavailable(err) => {
                warn!(error = %err, "full-text search unavailable, using substring match");
                self.search_substring(query)
            }
        }
    }
}
