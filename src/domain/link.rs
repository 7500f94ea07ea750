//! Wiki-style links between notes.

use crate::domain::{Note, NoteId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The target side of an outgoing link, as supplied by the editor.
///
/// Links are addressed by title text. `target_id` is filled in once the
/// title has been resolved to a concrete note; until then the link is
/// unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTarget {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<NoteId>,
}

impl LinkTarget {
    /// Creates an unresolved link target.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            target_id: None,
        }
    }

    /// Creates a link target already resolved to a note.
    pub fn resolved(title: impl Into<String>, target_id: NoteId) -> Self {
        Self {
            title: title.into(),
            target_id: Some(target_id),
        }
    }
}

impl From<&str> for LinkTarget {
    fn from(title: &str) -> Self {
        Self::new(title)
    }
}

/// A stored link row: `source_id` references `target_title`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteLink {
    pub source_id: NoteId,
    pub target_title: String,
    pub target_id: Option<NoteId>,
}

impl NoteLink {
    /// Returns true once the link points at a concrete note id.
    pub fn is_resolved(&self) -> bool {
        self.target_id.is_some()
    }
}

impl fmt::Display for NoteLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> [[{}]]", self.source_id.short(), self.target_title)
    }
}

/// A link pointing at some title, paired with its source note.
///
/// `source` is `None` when the source note is missing or deleted; such a
/// dangling backlink is still reported so callers can flag it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Backlink {
    pub link: NoteLink,
    pub source: Option<Note>,
}

impl Backlink {
    /// Returns true if the source note is gone.
    pub fn is_dangling(&self) -> bool {
        self.source.is_none()
    }
}
