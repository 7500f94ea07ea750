//! duru-cache - local offline note store with an outbound sync queue

pub mod cli;
pub mod domain;
pub mod store;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{
    Cli, Command,
    config::Config,
    handlers::{
        handle_backlinks, handle_list, handle_queue, handle_reindex, handle_reset,
        handle_resolve_links, handle_search, handle_show, handle_status, handle_suggest,
        handle_tagged, handle_tags,
    },
};

/// Main entry point for the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::Completions(args) = &cli.command {
        clap_complete::generate(
            args.shell,
            &mut Cli::command(),
            "duru-cache",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    let config = Config::load()?;
    let db_path = config.database_path(cli.db.as_ref());

    match &cli.command {
        Command::List(args) => handle_list(args, &db_path),
        Command::Show(args) => handle_show(args, &db_path),
        Command::Search(args) => handle_search(args, &db_path),
        Command::Suggest(args) => handle_suggest(args, &db_path),
        Command::Tags(args) => handle_tags(args, &db_path),
        Command::Tagged(args) => handle_tagged(args, &db_path),
        Command::Backlinks(args) => handle_backlinks(args, &db_path),
        Command::Queue(args) => handle_queue(args, &db_path),
        Command::Status(args) => handle_status(args, &db_path),
        Command::Reindex => handle_reindex(&db_path),
        Command::ResolveLinks => handle_resolve_links(&db_path),
        Command::Reset(args) => handle_reset(args, &db_path),
        Command::Completions(_) => Ok(()),
    }
}

/// Installs a stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("duru_cache={}", level)));

    // A second init (tests calling run twice) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
