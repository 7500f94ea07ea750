//! Outbox entries: local mutations waiting to be pushed.

use crate::domain::{Note, NoteId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of mutation an outbox entry replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    UpsertNote,
    DeleteNote,
}

impl OpKind {
    /// Returns the tag persisted in the `kind` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::UpsertNote => "upsert_note",
            OpKind::DeleteNote => "delete_note",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown op kind tag.
#[derive(Debug, Clone)]
pub struct ParseOpKindError(String);

impl fmt::Display for ParseOpKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown op kind '{}'", self.0)
    }
}

impl std::error::Error for ParseOpKindError {}

impl FromStr for OpKind {
    type Err = ParseOpKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upsert_note" => Ok(OpKind::UpsertNote),
            "delete_note" => Ok(OpKind::DeleteNote),
            other => Err(ParseOpKindError(other.to_string())),
        }
    }
}

/// One not-yet-synced mutation.
///
/// `id` is assigned by the store, strictly increasing, and is the delivery
/// order. Several ops may target the same entity; they are never coalesced
/// and must be replayed in `id` order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingOp {
    pub id: i64,
    pub entity_id: NoteId,
    pub kind: OpKind,
    pub payload: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PendingOp {
    /// Decodes the note snapshot carried by an upsert op.
    ///
    /// Returns `Ok(None)` for ops without a payload.
    pub fn note_snapshot(&self) -> serde_json::Result<Option<Note>> {
        self.payload
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
    }
}
