//! Task model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use super::comment::Comment;

/// Identifier of a task, stable for the task's whole life
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TaskId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

/// User-facing task priority (not to be confused with sync priority)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

/// Due date and its all-day flag, which always change together
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Due {
    #[serde(default, rename = "dueDateTime")]
    pub date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_all_day: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatFrequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Recurrence of a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatRule {
    pub frequency: RepeatFrequency,
    /// Repeat every `interval` units of `frequency`
    #[serde(default = "default_repeat_interval")]
    pub interval: u32,
}

const fn default_repeat_interval() -> u32 {
    1
}

/// File attached to a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub file_name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

/// A task snapshot as held locally or returned by the server.
///
/// Snapshots are values: merge rules never modify one in place, they build
/// a new snapshot through the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(flatten)]
    pub due: Due,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub reminder_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub repeat_rule: Option<RepeatRule>,
    /// Lists this task belongs to
    #[serde(default)]
    pub list_ids: Vec<String>,
    /// Members the task is assigned to
    #[serde(default)]
    pub assignee_ids: Vec<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new task stamped at `now`
    pub fn new(id: TaskId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            completed: false,
            due: Due::default(),
            priority: TaskPriority::None,
            reminder_at: None,
            repeat_rule: None,
            list_ids: Vec::new(),
            assignee_ids: Vec::new(),
            is_private: false,
            attachments: Vec::new(),
            comments: Vec::new(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    #[must_use]
    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_description(self, description: Option<String>) -> Self {
        Self {
            description,
            ..self
        }
    }

    #[must_use]
    pub fn with_completed(self, completed: bool) -> Self {
        Self { completed, ..self }
    }

    #[must_use]
    pub fn with_due(self, due: Due) -> Self {
        Self { due, ..self }
    }

    #[must_use]
    pub fn with_priority(self, priority: TaskPriority) -> Self {
        Self { priority, ..self }
    }

    #[must_use]
    pub fn with_updated_at(self, updated_at: Option<DateTime<Utc>>) -> Self {
        Self { updated_at, ..self }
    }
}
