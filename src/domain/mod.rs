//! Core types: Note, NoteId, Tag, links, outbox entries

mod link;
mod note;
mod note_id;
mod pending_op;
mod tag;

pub use link::{Backlink, LinkTarget, NoteLink};
pub use note::{Note, NoteBuilder};
pub use note_id::{NoteId, ParseNoteIdError};
pub use pending_op::{OpKind, ParseOpKindError, PendingOp};
pub use tag::{ParseTagError, Tag};
