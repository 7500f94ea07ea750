//! Builder for test notes with sensible defaults.

// Allow dead code since this is a test utility shared by several test binaries
#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use duru_cache::domain::{LinkTarget, Note, NoteId, Tag};
use std::collections::BTreeSet;

/// Builder for creating test notes with sensible defaults.
///
/// Automatically generates an ID and timestamp, with a fluent API for
/// setting content and relations.
#[derive(Debug)]
pub struct TestNote {
    id: NoteId,
    title: String,
    body: String,
    updated_at: DateTime<Utc>,
    deleted: bool,
    tags: BTreeSet<Tag>,
    links: Vec<LinkTarget>,
}

impl TestNote {
    /// Creates a new test note with the given title.
    ///
    /// Automatically generates a unique ID and sets the timestamp to now.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: NoteId::new(),
            title: title.into(),
            body: String::new(),
            updated_at: Utc::now(),
            deleted: false,
            tags: BTreeSet::new(),
            links: Vec::new(),
        }
    }

    /// Sets an explicit ID for the note.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into().parse().expect("Invalid NoteId");
        self
    }

    /// Sets the body content (builder method).
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Shifts the timestamp to `minutes` before now.
    pub fn minutes_ago(mut self, minutes: i64) -> Self {
        self.updated_at = Utc::now() - Duration::minutes(minutes);
        self
    }

    /// Marks the note deleted.
    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    /// Adds a tag to the note.
    pub fn tag(mut self, tag: impl AsRef<str>) -> Self {
        self.tags.insert(Tag::new(tag.as_ref()).expect("Invalid tag"));
        self
    }

    /// Adds an unresolved link to the note.
    pub fn link(mut self, title: impl Into<String>) -> Self {
        self.links.push(LinkTarget::new(title));
        self
    }

    /// Returns the title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the ID.
    pub fn note_id(&self) -> &NoteId {
        &self.id
    }

    /// Returns the tag set.
    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }

    /// Returns the outgoing links.
    pub fn links(&self) -> &[LinkTarget] {
        &self.links
    }

    /// Converts this TestNote to a domain Note.
    pub fn to_note(&self) -> Note {
        Note::builder(self.id.clone(), self.updated_at)
            .title(&self.title)
            .body(&self.body)
            .deleted(self.deleted)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_new_with_title() {
        let note = TestNote::new("My Test Note");
        assert_eq!(note.title(), "My Test Note");
    }

    #[test]
    fn test_note_generates_id() {
        let note = TestNote::new("Test");
        assert_eq!(note.note_id().to_string().len(), 26, "Should generate a ULID");
    }

    #[test]
    fn test_note_builder_fluent() {
        let note = TestNote::new("Grocery List")
            .body("milk eggs")
            .tag("home")
            .link("Pantry")
            .deleted();

        let domain_note = note.to_note();
        assert_eq!(domain_note.title(), "Grocery List");
        assert_eq!(domain_note.body(), "milk eggs");
        assert!(domain_note.is_deleted());
        assert_eq!(note.tags().len(), 1);
        assert_eq!(note.links()[0].title, "Pantry");
    }

    #[test]
    fn test_note_minutes_ago_is_older() {
        let older = TestNote::new("Old").minutes_ago(10).to_note();
        let newer = TestNote::new("New").to_note();
        assert!(older.updated_at() < newer.updated_at());
    }
}
