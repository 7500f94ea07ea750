//! NoteRepository implementation for SqliteStore.

use super::SqliteStore;
use super::rows::{NOTE_COLUMNS, datetime_to_millis, note_from_row};
use super::search::escape_like;
use crate::domain::{Backlink, LinkTarget, Note, NoteId, NoteLink, Tag};
use crate::store::{NoteRepository, StoreResult, StoreStats};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::{BTreeSet, HashSet};

/// Inserts or updates one note row.
///
/// Uses `ON CONFLICT ... DO UPDATE` rather than `INSERT OR REPLACE` so the
/// update hook fires instead of a delete the index never hears about.
pub(super) fn write_note_row(conn: &Connection, note: &Note) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO notes (id, title, body, updated_at, deleted)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
             title = excluded.title,
             body = excluded.body,
             updated_at = excluded.updated_at,
             deleted = excluded.deleted",
        params![
            note.id(),
            note.title(),
            note.body(),
            datetime_to_millis(note.updated_at()),
            note.is_deleted(),
        ],
    )?;
    Ok(())
}

/// Flags one live note row deleted. Returns false for unknown or already
/// deleted notes, whose timestamp is left alone.
pub(super) fn mark_note_deleted(
    conn: &Connection,
    id: &NoteId,
    at: DateTime<Utc>,
) -> StoreResult<bool> {
    let changed = conn.execute(
        "UPDATE notes SET deleted = 1, updated_at = ?2 WHERE id = ?1 AND deleted = 0",
        params![id, datetime_to_millis(at)],
    )?;
    Ok(changed > 0)
}

impl SqliteStore {
    /// Runs a note query and decodes every row.
    pub(super) fn query_notes(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StoreResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(sql)?;
        let notes = stmt
            .query_map(params, |row| note_from_row(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(notes)
    }

    /// Number of live notes.
    pub fn note_count(&self) -> StoreResult<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM notes WHERE deleted = 0", [], |row| {
                row.get(0)
            })?;
        Ok(n as usize)
    }

    /// Row counts for diagnostics.
    pub fn stats(&self) -> StoreResult<StoreStats> {
        let count = |sql: &str| -> StoreResult<usize> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as usize)
        };

        Ok(StoreStats {
            schema_version: self.schema_version()?,
            active_notes: self.note_count()?,
            deleted_notes: count("SELECT COUNT(*) FROM notes WHERE deleted = 1")?,
            tags: count("SELECT COUNT(DISTINCT tag) FROM note_tags")?,
            links: count("SELECT COUNT(*) FROM note_links")?,
            unresolved_links: count("SELECT COUNT(*) FROM note_links WHERE target_id IS NULL")?,
            pending_ops: count("SELECT COUNT(*) FROM pending_ops")?,
        })
    }
}

impl NoteRepository for SqliteStore {
    fn upsert_note(&mut self, note: &Note) -> StoreResult<()> {
        write_note_row(&self.conn, note)
    }

    fn find_note(&self, id: &NoteId) -> StoreResult<Option<Note>> {
        let note = self
            .conn
            .query_row(
                &format!("SELECT {} FROM notes n WHERE n.id = ?1", NOTE_COLUMNS),
                [id],
                |row| note_from_row(row, 0),
            )
            .optional()?;
        Ok(note)
    }

    fn all_notes(&self) -> StoreResult<Vec<Note>> {
        self.query_notes(
            &format!(
                "SELECT {} FROM notes n
                 WHERE n.deleted = 0
                 ORDER BY n.updated_at DESC, n.id",
                NOTE_COLUMNS
            ),
            [],
        )
    }

    fn suggest_notes_by_title_prefix(&self, query: &str, limit: usize) -> StoreResult<Vec<Note>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let query = query.trim();

        if query.is_empty() {
            return self.query_notes(
                &format!(
                    "SELECT {} FROM notes n
                     WHERE n.deleted = 0
                     ORDER BY n.updated_at DESC, n.id
                     LIMIT ?1",
                    NOTE_COLUMNS
                ),
                [limit],
            );
        }

        let escaped = escape_like(query);
        let starts_with = format!("{}%", escaped);
        let word_start = format!("% {}%", escaped);

        self.query_notes(
            &format!(
                "SELECT {} FROM notes n
                 WHERE n.deleted = 0
                   AND (n.title LIKE ?1 ESCAPE '\\' OR n.title LIKE ?2 ESCAPE '\\')
                 ORDER BY n.title ASC, n.id
                 LIMIT ?3",
                NOTE_COLUMNS
            ),
            params![starts_with, word_start, limit],
        )
    }

    fn replace_tags_for_note(
        &mut self,
        note_id: &NoteId,
        tags: &BTreeSet<Tag>,
    ) -> StoreResult<()> {
        let tx = self.transaction()?;

        tx.execute("DELETE FROM note_tags WHERE note_id = ?1", [note_id])?;
        {
            let mut insert = tx
                .conn()
                .prepare("INSERT INTO note_tags (note_id, tag) VALUES (?1, ?2)")?;
            for tag in tags {
                insert.execute(params![note_id, tag])?;
            }
        }

        tx.commit()
    }

    fn replace_links_for_note(
        &mut self,
        note_id: &NoteId,
        targets: &[LinkTarget],
    ) -> StoreResult<()> {
        let tx = self.transaction()?;

        tx.execute("DELETE FROM note_links WHERE source_id = ?1", [note_id])?;
        {
            let mut insert = tx.conn().prepare(
                "INSERT INTO note_links (source_id, target_title, target_id) VALUES (?1, ?2, ?3)",
            )?;
            for target in targets {
                insert.execute(params![note_id, target.title, target.target_id])?;
            }
        }

        tx.commit()
    }

    fn distinct_tags(&self) -> StoreResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT t.tag FROM note_tags t
             JOIN notes n ON n.id = t.note_id
             WHERE n.deleted = 0
             ORDER BY t.tag COLLATE NOCASE, t.tag",
        )?;
        let tags = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<Tag>, _>>()?;
        Ok(tags)
    }

    fn notes_with_tag(&self, tag: &Tag) -> StoreResult<Vec<Note>> {
        self.query_notes(
            &format!(
                "SELECT {} FROM notes n
                 JOIN note_tags t ON t.note_id = n.id
                 WHERE t.tag = ?1 AND n.deleted = 0
                 ORDER BY n.updated_at DESC, n.id",
                NOTE_COLUMNS
            ),
            [tag],
        )
    }

    fn backlinks_with_sources(&self, target_title: &str) -> StoreResult<Vec<Backlink>> {
        // Sources that are gone still yield a row, with NULL note columns.
        let mut stmt = self.conn.prepare(&format!(
            "SELECT l.source_id, l.target_title, l.target_id, {}
             FROM note_links l
             LEFT JOIN notes n ON n.id = l.source_id AND n.deleted = 0
             WHERE l.target_title = ?1
             ORDER BY n.updated_at IS NULL, n.updated_at DESC, l.source_id",
            NOTE_COLUMNS
        ))?;

        let backlinks = stmt
            .query_map([target_title], |row| {
                let link = NoteLink {
                    source_id: row.get(0)?,
                    target_title: row.get(1)?,
                    target_id: row.get(2)?,
                };
                let source = match row.get::<_, Option<String>>(3)? {
                    Some(_) => Some(note_from_row(row, 3)?),
                    None => None,
                };
                Ok(Backlink { link, source })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(backlinks)
    }

    fn clear_all(&mut self) -> StoreResult<()> {
        let tx = self.transaction()?;
        tx.execute("DELETE FROM note_tags", [])?;
        tx.execute("DELETE FROM note_links", [])?;
        tx.execute("DELETE FROM pending_ops", [])?;
        tx.execute("DELETE FROM notes", [])?;
        tx.execute("DELETE FROM notes_fts", [])?;
        tx.commit()
    }

    fn local_active_note_ids(&self) -> StoreResult<HashSet<NoteId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM notes WHERE deleted = 0")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<HashSet<NoteId>, _>>()?;
        Ok(ids)
    }

    fn soft_delete_note(&mut self, id: &NoteId, at: DateTime<Utc>) -> StoreResult<bool> {
        mark_note_deleted(&self.conn, id, at)
    }

    fn purge_note(&mut self, id: &NoteId) -> StoreResult<bool> {
        let tx = self.transaction()?;
        tx.execute("DELETE FROM note_tags WHERE note_id = ?1", [id])?;
        tx.execute("DELETE FROM note_links WHERE source_id = ?1", [id])?;
        let removed = tx.execute("DELETE FROM notes WHERE id = ?1", [id])?;
        tx.commit()?;
        Ok(removed > 0)
    }

    fn tags_for_note(&self, id: &NoteId) -> StoreResult<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare("SELECT tag FROM note_tags WHERE note_id = ?1 ORDER BY tag")?;
        let tags = stmt
            .query_map([id], |row| row.get(0))?
            .collect::<Result<Vec<Tag>, _>>()?;
        Ok(tags)
    }

    fn links_for_note(&self, id: &NoteId) -> StoreResult<Vec<NoteLink>> {
        let mut stmt = self.conn.prepare(
            "SELECT source_id, target_title, target_id FROM note_links
             WHERE source_id = ?1
             ORDER BY target_title",
        )?;
        let links = stmt
            .query_map([id], |row| {
                Ok(NoteLink {
                    source_id: row.get(0)?,
                    target_title: row.get(1)?,
                    target_id: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }

    fn resolve_links(&mut self) -> StoreResult<usize> {
        // Several live notes may share a title; the most recently updated wins.
        let resolved = self.conn.execute(
            "UPDATE note_links SET target_id = (
                 SELECT n.id FROM notes n
                 WHERE n.title = note_links.target_title AND n.deleted = 0
                 ORDER BY n.updated_at DESC, n.id
                 LIMIT 1
             )
             WHERE target_id IS NULL
               AND EXISTS (
                 SELECT 1 FROM notes n
                 WHERE n.title = note_links.target_title AND n.deleted = 0
               )",
            [],
        )?;
        Ok(resolved)
    }
}
