//! Note struct representing one cached user document.

use crate::domain::NoteId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A user document as held by the local cache.
///
/// Title and body are opaque strings: the cache stores whatever the layer
/// above hands it, plaintext or ciphertext alike. A note is never removed by
/// an ordinary edit; deleting it sets the `deleted` flag (a tombstone) so the
/// deletion can be propagated.
///
/// Timestamps are kept at millisecond precision, the resolution the store
/// persists.
///
/// # Examples
///
/// ```
/// use duru_cache::domain::{Note, NoteId};
/// use chrono::Utc;
///
/// let note = Note::builder(NoteId::new(), Utc::now())
///     .title("Grocery List")
///     .body("milk eggs")
///     .build();
/// assert_eq!(note.title(), "Grocery List");
/// assert!(!note.is_deleted());
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    id: NoteId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    deleted: bool,
}

impl Note {
    /// Creates an empty, live note.
    pub fn new(id: NoteId, updated_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: String::new(),
            body: String::new(),
            updated_at: truncate_to_millis(updated_at),
            deleted: false,
        }
    }

    /// Creates a builder for constructing a Note with optional fields.
    pub fn builder(id: NoteId, updated_at: DateTime<Utc>) -> NoteBuilder {
        NoteBuilder::new(id, updated_at)
    }

    /// Returns the note's unique identifier.
    pub fn id(&self) -> &NoteId {
        &self.id
    }

    /// Returns the note's title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the note's body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns when the note was last written.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true if the note is a tombstone.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Returns a copy with new content and timestamp.
    pub fn edited(
        &self,
        title: impl Into<String>,
        body: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: self.id.clone(),
            title: title.into(),
            body: body.into(),
            updated_at: truncate_to_millis(at),
            deleted: self.deleted,
        }
    }

    /// Returns a tombstone copy of this note stamped with `at`.
    pub fn tombstone(&self, at: DateTime<Utc>) -> Self {
        Self {
            deleted: true,
            updated_at: truncate_to_millis(at),
            ..self.clone()
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.title, self.id.short())
    }
}

impl fmt::Debug for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Note")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("body_len", &self.body.len())
            .field("updated_at", &self.updated_at)
            .field("deleted", &self.deleted)
            .finish()
    }
}

/// Builder for constructing a Note with optional fields.
pub struct NoteBuilder {
    id: NoteId,
    updated_at: DateTime<Utc>,
    title: String,
    body: String,
    deleted: bool,
}

impl NoteBuilder {
    /// Creates a new builder with the required fields.
    pub fn new(id: NoteId, updated_at: DateTime<Utc>) -> Self {
        Self {
            id,
            updated_at,
            title: String::new(),
            body: String::new(),
            deleted: false,
        }
    }

    /// Sets the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the tombstone flag.
    pub fn deleted(mut self, deleted: bool) -> Self {
        self.deleted = deleted;
        self
    }

    /// Builds the Note.
    pub fn build(self) -> Note {
        Note {
            id: self.id,
            title: self.title,
            body: self.body,
            updated_at: truncate_to_millis(self.updated_at),
            deleted: self.deleted,
        }
    }
}

/// Drops sub-millisecond precision so a note survives a store round-trip unchanged.
pub(crate) fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at)
}
