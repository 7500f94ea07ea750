//! Tag command handlers (tags, tagged).

use anyhow::{Context, Result};
use std::path::Path;

use super::{open_store, print_notes};
use crate::cli::output::{Output, OutputFormat, TagListing};
use crate::cli::{TaggedArgs, TagsArgs};
use crate::domain::Tag;
use crate::store::NoteRepository;

pub fn handle_tags(args: &TagsArgs, db_path: &Path) -> Result<()> {
    let store = open_store(db_path)?;

    let tags = store
        .distinct_tags()
        .with_context(|| "failed to list tags")?;

    match args.format {
        OutputFormat::Human => {
            if tags.is_empty() {
                println!("No tags found.");
            } else {
                for tag in &tags {
                    println!("{}", tag);
                }
            }
        }
        OutputFormat::Json => {
            let listings: Vec<TagListing> = tags
                .iter()
                .map(|t| TagListing {
                    name: t.to_string(),
                })
                .collect();
            println!("{}", Output::new(listings).to_json()?);
        }
    }
    Ok(())
}

pub fn handle_tagged(args: &TaggedArgs, db_path: &Path) -> Result<()> {
    // Validate before touching the store
    let tag =
        Tag::new(&args.tag).map_err(|e| anyhow::anyhow!("invalid tag '{}': {}", args.tag, e))?;

    let store = open_store(db_path)?;
    let notes = store
        .notes_with_tag(&tag)
        .with_context(|| format!("failed to list notes with tag: {}", tag))?;

    print_notes(&notes, args.format, "No notes with that tag.")
}
