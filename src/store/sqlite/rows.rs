//! Column lists and row decoding shared by the query modules.

use crate::domain::{Note, NoteId, OpKind, PendingOp};
use chrono::{DateTime, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

/// Note columns in the order [`note_from_row`] reads them.
pub(super) const NOTE_COLUMNS: &str = "n.id, n.title, n.body, n.updated_at, n.deleted";

/// Pending op columns in the order [`pending_op_from_row`] reads them.
pub(super) const OP_COLUMNS: &str = "id, entity_id, kind, payload, created_at";

/// Decodes a note starting at column `offset`.
pub(super) fn note_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Note> {
    let id: NoteId = row.get(offset)?;
    let updated_at = millis_to_datetime(row.get(offset + 3)?, offset + 3)?;
    Ok(Note::builder(id, updated_at)
        .title(row.get::<_, String>(offset + 1)?)
        .body(row.get::<_, String>(offset + 2)?)
        .deleted(row.get::<_, bool>(offset + 4)?)
        .build())
}

/// Decodes a pending op laid out as [`OP_COLUMNS`].
pub(super) fn pending_op_from_row(row: &Row<'_>) -> rusqlite::Result<PendingOp> {
    let kind: String = row.get(2)?;
    let kind: OpKind = kind
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    Ok(PendingOp {
        id: row.get(0)?,
        entity_id: row.get(1)?,
        kind,
        payload: row.get(3)?,
        created_at: millis_to_datetime(row.get(4)?, 4)?,
    })
}

/// Converts a timestamp to the epoch milliseconds stored on disk.
pub(super) fn datetime_to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn millis_to_datetime(ms: i64, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            Type::Integer,
            format!("timestamp out of range: {}", ms).into(),
        )
    })
}
