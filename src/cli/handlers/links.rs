//! Link command handlers (backlinks, resolve-links).

use anyhow::{Context, Result};
use std::path::Path;

use super::{open_store, truncate_str};
use crate::cli::BacklinksArgs;
use crate::cli::output::{BacklinkListing, Output, OutputFormat};
use crate::store::NoteRepository;

pub fn handle_backlinks(args: &BacklinksArgs, db_path: &Path) -> Result<()> {
    let store = open_store(db_path)?;

    let backlinks = store
        .backlinks_with_sources(&args.title)
        .with_context(|| "failed to query backlinks")?;

    match args.format {
        OutputFormat::Human => {
            if backlinks.is_empty() {
                println!("No backlinks found.");
            } else {
                println!("{:<10}  {:<50}", "Source", "Title");
                println!(
                    "{:<10}  {:<50}",
                    "----------", "--------------------------------------------------"
                );

                for backlink in &backlinks {
                    let title = match &backlink.source {
                        Some(note) => truncate_str(note.title(), 50),
                        None => "(missing source)".to_string(),
                    };
                    println!("{:<10}  {:<50}", backlink.link.source_id.short(), title);
                }

                let dangling = backlinks.iter().filter(|b| b.is_dangling()).count();
                println!();
                if dangling > 0 {
                    println!("{} backlink(s), {} dangling", backlinks.len(), dangling);
                } else {
                    println!("{} backlink(s)", backlinks.len());
                }
            }
        }
        OutputFormat::Json => {
            let listings: Vec<BacklinkListing> =
                backlinks.iter().map(BacklinkListing::from).collect();
            println!("{}", Output::new(listings).to_json()?);
        }
    }
    Ok(())
}

pub fn handle_resolve_links(db_path: &Path) -> Result<()> {
    let mut store = open_store(db_path)?;

    let resolved = store
        .resolve_links()
        .with_context(|| "failed to resolve links")?;

    println!("Resolved {} link(s)", resolved);
    Ok(())
}
