//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::util::timestamp_or_earliest;

/// Id prefix marking a comment created offline and not yet acknowledged by
/// the server.
pub const PENDING_LOCAL_PREFIX: &str = "temp_";

/// Identifier of a comment, either server-assigned or pending-local.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(String);

impl CommentId {
    /// Wrap a server-assigned id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a fresh pending-local id (`temp_` + UUID v7)
    #[must_use]
    pub fn pending() -> Self {
        Self(format!("{PENDING_LOCAL_PREFIX}{}", Uuid::now_v7()))
    }

    /// Whether this id denotes a creation the server has not acknowledged yet
    pub fn is_pending_local(&self) -> bool {
        self.0.starts_with(PENDING_LOCAL_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CommentId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

/// A comment attached to a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    /// Comment body
    #[serde(default)]
    pub text: String,
    /// Author member id, when known
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Comment {
    /// Create a new pending-local comment stamped at `now`
    pub fn new_local(text: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: CommentId::pending(),
            text: text.into(),
            author_id: None,
            created_at: Some(now),
            updated_at: None,
        }
    }

    /// Timestamp used to compare two versions of the same comment:
    /// `updatedAt` when present, otherwise `createdAt`, otherwise the
    /// earliest possible instant.
    pub fn last_modified(&self) -> DateTime<Utc> {
        timestamp_or_earliest(self.updated_at.or(self.created_at))
    }

    /// Creation time with a missing value treated as the earliest instant
    pub fn created_or_earliest(&self) -> DateTime<Utc> {
        timestamp_or_earliest(self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn pending_ids_carry_reserved_prefix() {
        let id = CommentId::pending();
        assert!(id.as_str().starts_with(PENDING_LOCAL_PREFIX));
        assert!(id.is_pending_local());
        assert_ne!(CommentId::pending(), id);
    }

    #[test]
    fn server_ids_are_not_pending() {
        assert!(!CommentId::new("c1").is_pending_local());
        assert!(!CommentId::new("c_temp_1").is_pending_local());
    }

    #[test]
    fn last_modified_prefers_updated_at() {
        let created = Utc.timestamp_opt(100, 0).unwrap();
        let updated = Utc.timestamp_opt(200, 0).unwrap();
        let mut comment = Comment::new_local("hi", created);
        assert_eq!(comment.last_modified(), created);

        comment.updated_at = Some(updated);
        assert_eq!(comment.last_modified(), updated);

        comment.created_at = None;
        comment.updated_at = None;
        assert_eq!(comment.last_modified(), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn comment_deserializes_with_missing_timestamps() {
        let comment: Comment = serde_json::from_str(r#"{"id":"c1","text":"hello"}"#).unwrap();
        assert_eq!(comment.id, CommentId::new("c1"));
        assert_eq!(comment.created_at, None);
        assert_eq!(comment.updated_at, None);
    }
}
