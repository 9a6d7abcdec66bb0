//! Sync scheduling and reconciliation.
//!
//! - [`retry`]: per-operation exponential backoff
//! - [`outbox`]: priority ordering of pending operations and the in-memory
//!   outbox built on it
//! - [`resolver`]: conflict detection and field-level merge for tasks and
//!   comments

pub mod outbox;
pub mod resolver;
pub mod retry;

pub use outbox::{compare_pending, FailureOutcome, OperationId, PendingOperation, SyncOutbox};
pub use resolver::{ConflictResolver, TaskResolution};
pub use retry::RetryPolicy;
