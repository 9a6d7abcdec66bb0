//! Shared sync vocabulary: entity types, priority tiers, and operation kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority tier of a pending sync operation.
///
/// Lower raw value means higher priority; the derived `Ord` follows the
/// declaration order, so `Critical < High < Normal < Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum SyncPriority {
    /// Completion toggles: explicit user intent
    Critical = 0,
    /// Entity creation
    High = 1,
    /// Entity field updates
    Normal = 2,
    /// Attachments and non-critical metadata
    Low = 3,
}

impl SyncPriority {
    pub const fn raw_value(self) -> u8 {
        self as u8
    }

    /// Priority tier for a kind of outbound operation
    pub const fn for_kind(kind: OperationKind) -> Self {
        match kind {
            OperationKind::ToggleCompletion => Self::Critical,
            OperationKind::Create => Self::High,
            OperationKind::Update | OperationKind::Delete => Self::Normal,
            OperationKind::Attachment => Self::Low,
        }
    }
}

impl fmt::Display for SyncPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        };
        f.write_str(label)
    }
}

/// What an outbound operation does to its entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Update,
    ToggleCompletion,
    Delete,
    Attachment,
}

/// Kind of entity a pending operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncEntityType {
    Task,
    Comment,
    List,
    Member,
    Attachment,
}

/// How divergent copies of an entity type are reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictStrategy {
    /// Per-field merge rules
    FieldLevel,
    /// The server copy replaces the local one
    ServerWins,
}

impl SyncEntityType {
    pub const fn conflict_strategy(self) -> ConflictStrategy {
        match self {
            Self::Task | Self::Comment => ConflictStrategy::FieldLevel,
            Self::List | Self::Member | Self::Attachment => ConflictStrategy::ServerWins,
        }
    }
}

impl fmt::Display for SyncEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Task => "task",
            Self::Comment => "comment",
            Self::List => "list",
            Self::Member => "member",
            Self::Attachment => "attachment",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_follow_priority_order() {
        assert_eq!(SyncPriority::Critical.raw_value(), 0);
        assert_eq!(SyncPriority::High.raw_value(), 1);
        assert_eq!(SyncPriority::Normal.raw_value(), 2);
        assert_eq!(SyncPriority::Low.raw_value(), 3);
        assert!(SyncPriority::Critical < SyncPriority::Low);
    }

    #[test]
    fn operation_kinds_map_to_tiers() {
        assert_eq!(
            SyncPriority::for_kind(OperationKind::ToggleCompletion),
            SyncPriority::Critical
        );
        assert_eq!(SyncPriority::for_kind(OperationKind::Create), SyncPriority::High);
        assert_eq!(SyncPriority::for_kind(OperationKind::Update), SyncPriority::Normal);
        assert_eq!(SyncPriority::for_kind(OperationKind::Delete), SyncPriority::Normal);
        assert_eq!(SyncPriority::for_kind(OperationKind::Attachment), SyncPriority::Low);
    }

    #[test]
    fn collaborative_entities_default_to_server_wins() {
        assert_eq!(
            SyncEntityType::Task.conflict_strategy(),
            ConflictStrategy::FieldLevel
        );
        assert_eq!(
            SyncEntityType::Comment.conflict_strategy(),
            ConflictStrategy::FieldLevel
        );
        for entity in [
            SyncEntityType::List,
            SyncEntityType::Member,
            SyncEntityType::Attachment,
        ] {
            assert_eq!(entity.conflict_strategy(), ConflictStrategy::ServerWins);
        }
    }

    #[test]
    fn serde_uses_lowercase_tags() {
        assert_eq!(
            serde_json::to_string(&SyncPriority::Critical).unwrap(),
            "\"critical\""
        );
        let entity: SyncEntityType = serde_json::from_str("\"attachment\"").unwrap();
        assert_eq!(entity, SyncEntityType::Attachment);
        assert_eq!(entity.to_string(), "attachment");
    }
}
