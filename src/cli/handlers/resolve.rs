//! Note resolution utilities.

use anyhow::{Context, Result};

use crate::domain::{Note, NoteId};
use crate::store::NoteRepository;

/// Result of resolving a note identifier.
#[derive(Debug)]
pub enum ResolveResult {
    /// Exactly one note matched.
    Unique(Note),
    /// Multiple notes matched (ambiguous).
    Ambiguous(Vec<Note>),
    /// No notes matched.
    NotFound,
}

/// Prints the candidates of an ambiguous identifier to stderr.
pub(crate) fn print_ambiguous_notes(identifier: &str, notes: &[Note]) {
    eprintln!("Ambiguous: '{}' matches {} notes:", identifier, notes.len());
    for note in notes {
        eprintln!("  {} - {}", note.id(), note.title());
    }
    eprintln!();
    eprintln!("Use the full ID to specify which note you mean.");
}

/// Resolves a note identifier to a unique note.
///
/// Resolution order:
/// 1. Exact ID (tombstones included)
/// 2. ID prefix among live notes
/// 3. Exact title among live notes
pub fn resolve_note<R: NoteRepository>(repo: &R, identifier: &str) -> Result<ResolveResult> {
    let identifier = identifier.trim();

    if let Ok(id) = identifier.parse::<NoteId>()
        && let Some(note) = repo
            .find_note(&id)
            .with_context(|| "failed to look up note by ID")?
    {
        return Ok(ResolveResult::Unique(note));
    }

    let live = repo.all_notes().with_context(|| "failed to list notes")?;

    let mut candidates: Vec<Note> = live
        .into_iter()
        .filter(|n| n.id().as_str().starts_with(identifier) || n.title() == identifier)
        .collect();

    candidates.sort_by(|a, b| a.id().cmp(b.id()));
    candidates.dedup_by(|a, b| a.id() == b.id());

    match candidates.len() {
        0 => Ok(ResolveResult::NotFound),
        1 => Ok(candidates
            .pop()
            .map_or(ResolveResult::NotFound, ResolveResult::Unique)),
        _ => Ok(ResolveResult::Ambiguous(candidates)),
    }
}
