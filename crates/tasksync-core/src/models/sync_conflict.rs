//! Sync conflict model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::task::TaskId;

/// Field rule that let a local value survive a merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeRule {
    /// Local completion beat a server un-completed state
    Completion,
    Title,
    Description,
    /// Due date and all-day flag, taken as a pair
    Due,
    Priority,
}

impl fmt::Display for MergeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Completion => "completion",
            Self::Title => "title",
            Self::Description => "description",
            Self::Due => "due",
            Self::Priority => "priority",
        };
        f.write_str(label)
    }
}

/// Record of a task conflict that was detected and resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictRecord {
    /// Task involved in the conflict
    pub task_id: TaskId,
    /// Local snapshot's timestamp when the conflict was detected
    pub local_updated_at: DateTime<Utc>,
    /// Server snapshot's timestamp
    pub server_updated_at: DateTime<Utc>,
    /// `updatedAt` stamped on the resolved task
    pub resolved_at: DateTime<Utc>,
    /// Rules under which local values were kept, in application order
    pub applied: Vec<MergeRule>,
}

impl ConflictRecord {
    /// Whether the resolution kept only server values
    pub fn server_won(&self) -> bool {
        self.applied.is_empty()
    }
}
