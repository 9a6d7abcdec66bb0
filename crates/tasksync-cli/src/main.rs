//! tasksync CLI - inspect conflict resolution and retry scheduling
//!
//! Feeds JSON task and comment snapshots through the sync core and prints
//! what the engine would persist.

mod cli;
mod commands;
mod config;
mod error;


use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::backoff::run_backoff;
use crate::commands::comments::run_merge_comments;
use crate::commands::completions::run_completions;
use crate::commands::resolve::run_resolve_task;
use crate::config::load_config;
use crate::error::CliError;

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tasksync=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ResolveTask {
            local,
            server,
            merge_time,
            json,
        } => run_resolve_task(&local, &server, merge_time, json)?,
        Commands::MergeComments {
            local,
            server,
            json,
        } => run_merge_comments(&local, &server, json)?,
        Commands::Backoff { json } => {
            let config = load_config(cli.config)?;
            run_backoff(&config.retry, json)?;
        }
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}
