//! Output format types for CLI commands.

use clap::ValueEnum;
use serde::Serialize;

use crate::domain::{Backlink, Note, NoteLink, PendingOp};

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for programmatic consumption
    Json,
}

/// Wrapper for serializable command output.
#[derive(Debug, Serialize)]
pub struct Output<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> Output<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }

    /// Pretty-printed JSON for stdout.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// A single note in listing output.
#[derive(Debug, Serialize)]
pub struct NoteListing {
    pub id: String,
    pub title: String,
    pub updated_at: String,
}

impl From<&Note> for NoteListing {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id().to_string(),
            title: note.title().to_string(),
            updated_at: note.updated_at().to_rfc3339(),
        }
    }
}

/// A note with its relations, for `show`.
#[derive(Debug, Serialize)]
pub struct NoteDetail {
    pub id: String,
    pub title: String,
    pub body: String,
    pub updated_at: String,
    pub deleted: bool,
    pub tags: Vec<String>,
    pub links: Vec<LinkListing>,
}

/// An outgoing link.
#[derive(Debug, Serialize)]
pub struct LinkListing {
    pub target_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
}

impl From<&NoteLink> for LinkListing {
    fn from(link: &NoteLink) -> Self {
        Self {
            target_title: link.target_title.clone(),
            target_id: link.target_id.as_ref().map(|id| id.to_string()),
        }
    }
}

/// A backlink with its source, if the source is still live.
#[derive(Debug, Serialize)]
pub struct BacklinkListing {
    pub source_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_title: Option<String>,
    pub dangling: bool,
}

impl From<&Backlink> for BacklinkListing {
    fn from(backlink: &Backlink) -> Self {
        Self {
            source_id: backlink.link.source_id.to_string(),
            source_title: backlink.source.as_ref().map(|n| n.title().to_string()),
            dangling: backlink.is_dangling(),
        }
    }
}

/// A tag in listing output.
#[derive(Debug, Serialize)]
pub struct TagListing {
    pub name: String,
}

/// A pending outbox operation.
#[derive(Debug, Serialize)]
pub struct OpListing {
    pub id: i64,
    pub entity_id: String,
    pub kind: String,
    pub has_payload: bool,
    pub created_at: String,
}

impl From<&PendingOp> for OpListing {
    fn from(op: &PendingOp) -> Self {
        Self {
            id: op.id,
            entity_id: op.entity_id.to_string(),
            kind: op.kind.to_string(),
            has_payload: op.payload.is_some(),
            created_at: op.created_at.to_rfc3339(),
        }
    }
}
