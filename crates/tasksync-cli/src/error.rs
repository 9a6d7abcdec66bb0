use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] tasksync_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to read {path}: {source}")]
    ReadInput { path: String, source: io::Error },
    #[error("Failed to parse {path}: {source}")]
    ParseInput {
        path: String,
        source: serde_json::Error,
    },
}
