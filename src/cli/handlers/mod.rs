//! Command handlers for the CLI.

mod links;
mod maintenance;
mod notes;
mod resolve;
mod search;
mod tags;


use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::output::{NoteListing, Output, OutputFormat};
use crate::domain::Note;
use crate::store::SqliteStore;

// Re-export public items
pub use links::{handle_backlinks, handle_resolve_links};
pub use maintenance::{handle_queue, handle_reindex, handle_reset, handle_status};
pub use notes::{handle_list, handle_show, handle_suggest};
pub use resolve::{ResolveResult, resolve_note};
pub use search::handle_search;
pub use tags::{handle_tagged, handle_tags};

// ===========================================
// Shared Utilities
// ===========================================

/// Opens the store at `db_path`, migrating it if needed.
pub(crate) fn open_store(db_path: &Path) -> Result<SqliteStore> {
    SqliteStore::open(db_path)
        .with_context(|| format!("failed to open store at {}", db_path.display()))
}

/// Prints a note table (or JSON listing) in the requested format.
pub(crate) fn print_notes(notes: &[Note], format: OutputFormat, empty_message: &str) -> Result<()> {
    match format {
        OutputFormat::Human => {
            if notes.is_empty() {
                println!("{}", empty_message);
            } else {
                println!("{:<10}  {:<50}  {:>16}", "ID", "Title", "Updated");
                println!(
                    "{:<10}  {:<50}  {:>16}",
                    "----------",
                    "--------------------------------------------------",
                    "----------------"
                );

                for note in notes {
                    println!("{}", note_row(note));
                }

                println!();
                println!("{} note(s)", notes.len());
            }
        }
        OutputFormat::Json => {
            let listings: Vec<NoteListing> = notes.iter().map(NoteListing::from).collect();
            println!("{}", Output::new(listings).to_json()?);
        }
    }
    Ok(())
}

/// One line of the human note table.
pub(crate) fn note_row(note: &Note) -> String {
    let title = if note.title().is_empty() {
        "(untitled)".to_string()
    } else {
        truncate_str(note.title(), 50)
    };
    let updated = note.updated_at().format("%Y-%m-%d %H:%M").to_string();
    format!("{:<10}  {:<50}  {:>16}", note.id().short(), title, updated)
}

/// Truncates a string to a maximum display width, adding ellipsis if needed.
pub(crate) fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}
