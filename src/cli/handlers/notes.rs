//! Note listing handlers (ls, show, suggest).

use anyhow::{Context, Result, bail};
use std::path::Path;

use super::resolve::{ResolveResult, print_ambiguous_notes, resolve_note};
use super::{open_store, print_notes};
use crate::cli::output::{LinkListing, NoteDetail, Output, OutputFormat};
use crate::cli::{ListArgs, ShowArgs, SuggestArgs};
use crate::store::NoteRepository;

pub fn handle_list(args: &ListArgs, db_path: &Path) -> Result<()> {
    let store = open_store(db_path)?;

    let mut notes = store
        .all_notes()
        .with_context(|| "failed to list all notes")?;
    if let Some(limit) = args.limit {
        notes.truncate(limit);
    }

    print_notes(&notes, args.format, "No notes found.")
}

pub fn handle_show(args: &ShowArgs, db_path: &Path) -> Result<()> {
    let store = open_store(db_path)?;

    let note = match resolve_note(&store, &args.id)? {
        ResolveResult::Unique(note) => note,
        ResolveResult::Ambiguous(notes) => {
            print_ambiguous_notes(&args.id, &notes);
            bail!("ambiguous note identifier");
        }
        ResolveResult::NotFound => {
            bail!("note not found: '{}'", args.id);
        }
    };

    let tags = store
        .tags_for_note(note.id())
        .with_context(|| "failed to read tags")?;
    let links = store
        .links_for_note(note.id())
        .with_context(|| "failed to read links")?;

    match args.format {
        OutputFormat::Human => {
            println!("# {}", note.title());
            println!();
            println!(
                "ID: {}  Updated: {}{}",
                note.id(),
                note.updated_at().format("%Y-%m-%d %H:%M:%S"),
                if note.is_deleted() { "  (deleted)" } else { "" }
            );

            if !tags.is_empty() {
                let tags: Vec<_> = tags.iter().map(|t| t.as_str()).collect();
                println!("Tags: {}", tags.join(", "));
            }

            if !links.is_empty() {
                let links: Vec<_> = links
                    .iter()
                    .map(|l| {
                        if l.is_resolved() {
                            format!("[[{}]]", l.target_title)
                        } else {
                            format!("[[{}]]?", l.target_title)
                        }
                    })
                    .collect();
                println!("Links: {}", links.join(", "));
            }

            println!();

            if !note.body().is_empty() {
                println!("{}", note.body());
            }
        }
        OutputFormat::Json => {
            let detail = NoteDetail {
                id: note.id().to_string(),
                title: note.title().to_string(),
                body: note.body().to_string(),
                updated_at: note.updated_at().to_rfc3339(),
                deleted: note.is_deleted(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                links: links.iter().map(LinkListing::from).collect(),
            };
            println!("{}", Output::new(detail).to_json()?);
        }
    }

    Ok(())
}

pub fn handle_suggest(args: &SuggestArgs, db_path: &Path) -> Result<()> {
    let store = open_store(db_path)?;

    let notes = store
        .suggest_notes_by_title_prefix(&args.prefix, args.limit)
        .with_context(|| format!("suggest failed for prefix: {}", args.prefix))?;

    print_notes(&notes, args.format, "No matching titles.")
}
