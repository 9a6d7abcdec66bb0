//! tasksync-core - Core library for tasksync
//!
//! This crate contains the conflict resolution and retry-scheduling logic used
//! by the offline-first task sync engine. Everything here is pure computation
//! over value snapshots: network I/O and persistence live with the callers.

pub mod config;
pub mod error;
pub mod models;
pub mod sync;
pub mod util;

pub use config::{OutboxConfig, RetryConfig, SyncConfig};
pub use error::{Error, Result};
pub use models::{
    Comment, CommentId, ConflictRecord, ConflictStrategy, Due, MergeRule, OperationKind,
    SyncEntityType, SyncPriority, Task, TaskId, TaskPriority,
};
pub use sync::{
    compare_pending, ConflictResolver, FailureOutcome, OperationId, PendingOperation,
    RetryPolicy, SyncOutbox, TaskResolution,
};
