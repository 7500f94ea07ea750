//! Outbox implementation and the local mutation path that feeds it.

use super::SqliteStore;
use super::notes::{mark_note_deleted, write_note_row};
use super::rows::{OP_COLUMNS, datetime_to_millis, pending_op_from_row};
use crate::domain::{Note, NoteId, OpKind, PendingOp};
use crate::store::{NoteRepository, Outbox, StoreResult};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use tracing::debug;

/// Appends one op row and returns its id.
fn insert_op(
    conn: &Connection,
    entity_id: &NoteId,
    kind: OpKind,
    payload: Option<&str>,
) -> StoreResult<i64> {
    conn.execute(
        "INSERT INTO pending_ops (entity_id, kind, payload, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            entity_id,
            kind.as_str(),
            payload,
            datetime_to_millis(Utc::now())
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

impl SqliteStore {
    /// Saves a locally edited note and queues it for delivery.
    ///
    /// The upsert and the `upsert_note` op commit together. The op carries a
    /// JSON snapshot of the note so the sync driver can replay it without
    /// reading the notes table. Returns the op id.
    pub fn record_local_edit(&mut self, note: &Note) -> StoreResult<i64> {
        let snapshot = serde_json::to_string(note)?;

        let tx = self.transaction()?;
        write_note_row(tx.conn(), note)?;
        let op_id = insert_op(tx.conn(), note.id(), OpKind::UpsertNote, Some(&snapshot))?;
        tx.commit()?;

        Ok(op_id)
    }

    /// Soft-deletes a note locally and queues a `delete_note` op.
    ///
    /// Returns `None` without queueing anything when the note is unknown or
    /// already deleted.
    pub fn record_local_delete(
        &mut self,
        id: &NoteId,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<i64>> {
        let tx = self.transaction()?;
        if !mark_note_deleted(tx.conn(), id, at)? {
            return Ok(None);
        }
        let op_id = insert_op(tx.conn(), id, OpKind::DeleteNote, None)?;
        tx.commit()?;

        Ok(Some(op_id))
    }

    /// Applies a note received from the remote side. Never queues an op.
    pub fn apply_remote_note(&mut self, note: &Note) -> StoreResult<()> {
        self.upsert_note(note)
    }
}

impl Outbox for SqliteStore {
    fn enqueue(
        &mut self,
        entity_id: &NoteId,
        kind: OpKind,
        payload: Option<&str>,
    ) -> StoreResult<i64> {
        insert_op(&self.conn, entity_id, kind, payload)
    }

    fn pending_ops(&self) -> StoreResult<Vec<PendingOp>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM pending_ops ORDER BY id ASC",
            OP_COLUMNS
        ))?;
        let ops = stmt
            .query_map([], pending_op_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ops)
    }

    fn delete_pending_by_ids(&mut self, ids: &[i64]) -> StoreResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let tx = self.transaction()?;
        let mut removed = 0;
        {
            let mut delete = tx.conn().prepare("DELETE FROM pending_ops WHERE id = ?1")?;
            for id in ids {
                removed += delete.execute([id])?;
            }
        }
        tx.commit()?;

        debug!(requested = ids.len(), removed, "acknowledged pending ops");
        Ok(removed)
    }

    fn dequeue_all(&mut self) -> StoreResult<Vec<PendingOp>> {
        let tx = self.transaction()?;
        let ops = {
            let mut stmt = tx.conn().prepare(&format!(
                "SELECT {} FROM pending_ops ORDER BY id ASC",
                OP_COLUMNS
            ))?;
            stmt.query_map([], pending_op_from_row)?
                .collect::<Result<Vec<_>, _>>()?
        };
        tx.execute("DELETE FROM pending_ops", [])?;
        tx.commit()?;

        debug!(count = ops.len(), "dequeued pending ops");
        Ok(ops)
    }

    fn requeue(&mut self, ops: &[PendingOp]) -> StoreResult<Vec<i64>> {
        let mut ordered: Vec<&PendingOp> = ops.iter().collect();
        ordered.sort_by_key(|op| op.id);

        let tx = self.transaction()?;
        let mut ids = Vec::with_capacity(ordered.len());
        {
            // AUTOINCREMENT never reissues an id, so the originals are free.
            let mut insert = tx.conn().prepare(
                "INSERT INTO pending_ops (id, entity_id, kind, payload, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for op in ordered {
                insert.execute(params![
                    op.id,
                    op.entity_id,
                    op.kind.as_str(),
                    op.payload,
                    datetime_to_millis(op.created_at),
                ])?;
                ids.push(op.id);
            }
        }
        tx.commit()?;

        debug!(count = ids.len(), "requeued pending ops");
        Ok(ids)
    }

    fn pending_count(&self) -> StoreResult<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pending_ops", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}
