//! Search command handler.

use anyhow::{Context, Result};
use std::path::Path;

use super::{open_store, print_notes};
use crate::cli::SearchArgs;
use crate::store::NoteSearch;

pub fn handle_search(args: &SearchArgs, db_path: &Path) -> Result<()> {
    let store = open_store(db_path)?;

    let results = store
        .search_notes(&args.query)
        .with_context(|| format!("search failed for query: {}", args.query))?;

    print_notes(&results, args.format, "No matching notes found.")
}
