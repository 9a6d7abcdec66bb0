//! Error types for tasksync-core

use thiserror::Error;

/// Result type alias using tasksync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tasksync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Local and server snapshots do not describe the same entity
    #[error("Snapshot {field} mismatch: local={local} server={server}")]
    IdentityMismatch {
        field: &'static str,
        local: String,
        server: String,
    },

    /// Outbox reached its configured capacity
    #[error("Outbox full (capacity: {capacity})")]
    OutboxFull { capacity: usize },

    /// Another attempt for the same entity is still running
    #[error("Entity {entity} already has operation {operation} in flight")]
    EntityInFlight { entity: String, operation: u64 },

    /// No pending operation with the given id
    #[error("Unknown pending operation: {0}")]
    UnknownOperation(u64),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
