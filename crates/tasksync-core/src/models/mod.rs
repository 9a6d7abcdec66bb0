//! Data models for tasksync

mod comment;
mod sync_conflict;
mod task;
mod taxonomy;

pub use comment::{Comment, CommentId, PENDING_LOCAL_PREFIX};
pub use sync_conflict::{ConflictRecord, MergeRule};
pub use task::{Attachment, Due, RepeatFrequency, RepeatRule, Task, TaskId, TaskPriority};
pub use taxonomy::{ConflictStrategy, OperationKind, SyncEntityType, SyncPriority};
