//! Store maintenance handlers (queue, status, reindex, reset).

use anyhow::{Context, Result, bail};
use std::path::Path;
use tracing::info;

use super::open_store;
use crate::cli::output::{OpListing, Output, OutputFormat};
use crate::cli::{QueueArgs, ResetArgs, StatusArgs};
use crate::store::{NoteRepository, Outbox};

pub fn handle_queue(args: &QueueArgs, db_path: &Path) -> Result<()> {
    let store = open_store(db_path)?;

    let ops = store
        .pending_ops()
        .with_context(|| "failed to read pending operations")?;

    match args.format {
        OutputFormat::Human => {
            if ops.is_empty() {
                println!("Outbox is empty.");
            } else {
                println!("{:>6}  {:<12}  {:<28}  {:>19}", "ID", "Kind", "Entity", "Queued");
                for op in &ops {
                    println!(
                        "{:>6}  {:<12}  {:<28}  {:>19}",
                        op.id,
                        op.kind.as_str(),
                        op.entity_id.as_str(),
                        op.created_at.format("%Y-%m-%d %H:%M:%S")
                    );
                }
                println!();
                println!("{} pending operation(s)", ops.len());
            }
        }
        OutputFormat::Json => {
            let listings: Vec<OpListing> = ops.iter().map(OpListing::from).collect();
            println!("{}", Output::new(listings).to_json()?);
        }
    }
    Ok(())
}

pub fn handle_status(args: &StatusArgs, db_path: &Path) -> Result<()> {
    let store = open_store(db_path)?;

    let stats = store.stats().with_context(|| "failed to read store stats")?;

    match args.format {
        OutputFormat::Human => {
            println!("Database:        {}", db_path.display());
            println!("Schema version:  {}", stats.schema_version);
            println!("Notes:           {}", stats.active_notes);
            println!("Deleted notes:   {}", stats.deleted_notes);
            println!("Tags:            {}", stats.tags);
            println!(
                "Links:           {} ({} unresolved)",
                stats.links, stats.unresolved_links
            );
            println!("Pending ops:     {}", stats.pending_ops);
        }
        OutputFormat::Json => {
            println!("{}", Output::new(stats).to_json()?);
        }
    }
    Ok(())
}

pub fn handle_reindex(db_path: &Path) -> Result<()> {
    let mut store = open_store(db_path)?;

    store
        .rebuild_search_index()
        .with_context(|| "failed to rebuild search index")?;
    let count = store.note_count()?;

    println!("Indexed {} notes", count);
    Ok(())
}

pub fn handle_reset(args: &ResetArgs, db_path: &Path) -> Result<()> {
    if !args.yes {
        bail!(
            "reset deletes every note and pending operation in {}; rerun with --yes to confirm",
            db_path.display()
        );
    }

    let mut store = open_store(db_path)?;
    store.clear_all().with_context(|| "failed to clear store")?;

    info!(path = %db_path.display(), "local store reset");
    println!("Store cleared.");
    Ok(())
}
