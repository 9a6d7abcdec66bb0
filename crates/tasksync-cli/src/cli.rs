use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "tasksync")]
#[command(about = "Inspect offline task sync conflict resolution and retry schedules")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to sync config JSON
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a local/server task snapshot pair
    #[command(alias = "resolve")]
    ResolveTask {
        /// Local (device-authored) task JSON
        #[arg(long, value_name = "FILE")]
        local: PathBuf,
        /// Server (authoritative) task JSON
        #[arg(long, value_name = "FILE")]
        server: PathBuf,
        /// Merge time to stamp on the result (RFC 3339, defaults to now)
        #[arg(long, value_name = "TIME")]
        merge_time: Option<DateTime<Utc>>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Merge local and server comment lists for one task
    MergeComments {
        /// Local comments JSON array
        #[arg(long, value_name = "FILE")]
        local: PathBuf,
        /// Server comments JSON array
        #[arg(long, value_name = "FILE")]
        server: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the retry delay schedule for the active config
    Backoff {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
