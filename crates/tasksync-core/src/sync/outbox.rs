//! Outbound operation queue.
//!
//! Pending operations are ordered by [`SyncPriority`] (critical first) and,
//! within a tier, by enqueue order. Operations flow through the outbox as:
//! 1. `enqueue()` - add to the outbox
//! 2. `next_ready()` + `begin()` - pick the next operation and mark its
//!    entity in flight
//! 3. `complete()` on success, or `fail()` to schedule a retry; once the
//!    retry policy gives up, `fail()` removes the operation and hands it back
//!    as abandoned

use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::{OutboxConfig, RetryConfig, SyncConfig};
use crate::error::{Error, Result};
use crate::models::{OperationKind, SyncEntityType, SyncPriority};
use crate::sync::retry::RetryPolicy;

/// Identifier of a pending operation, assigned in enqueue order
pub type OperationId = u64;

/// An outbound mutation waiting to reach the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation<T> {
    /// Monotonic enqueue sequence, doubles as the FIFO tie-break
    pub id: OperationId,
    pub entity_type: SyncEntityType,
    pub entity_id: String,
    pub kind: OperationKind,
    pub priority: SyncPriority,
    pub payload: T,
    pub retry: RetryPolicy,
}

/// Dequeue order: priority ascending by raw value, then enqueue sequence.
pub fn compare_pending<T>(a: &PendingOperation<T>, b: &PendingOperation<T>) -> Ordering {
    a.priority
        .raw_value()
        .cmp(&b.priority.raw_value())
        .then_with(|| a.id.cmp(&b.id))
}

/// What happened to an operation after a failed attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureOutcome<T> {
    /// Still queued; retry no earlier than the given delay
    RetryAfter(Duration),
    /// Retries exhausted; removed from the outbox
    Abandoned(PendingOperation<T>),
}

type EntityKey = (SyncEntityType, String);

/// In-memory outbox of pending operations
#[derive(Debug)]
pub struct SyncOutbox<T> {
    config: OutboxConfig,
    retry_config: RetryConfig,
    next_id: OperationId,
    /// Kept in enqueue order
    operations: Vec<PendingOperation<T>>,
    /// Entity -> operation currently being attempted
    in_flight: HashMap<EntityKey, OperationId>,
}

impl<T> Default for SyncOutbox<T> {
    fn default() -> Self {
        Self::new(&SyncConfig::default())
    }
}

impl<T> SyncOutbox<T> {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            config: config.outbox,
            retry_config: config.retry,
            next_id: 0,
            operations: Vec::new(),
            in_flight: HashMap::new(),
        }
    }

    /// Add an operation using the priority tier of its kind.
    pub fn enqueue(
        &mut self,
        entity_type: SyncEntityType,
        entity_id: impl Into<String>,
        kind: OperationKind,
        payload: T,
    ) -> Result<OperationId> {
        self.enqueue_with_priority(
            entity_type,
            entity_id,
            kind,
            SyncPriority::for_kind(kind),
            payload,
        )
    }

    /// Add an operation with an explicit priority tier.
    ///
    /// Returns an error if the outbox is at capacity.
    pub fn enqueue_with_priority(
        &mut self,
        entity_type: SyncEntityType,
        entity_id: impl Into<String>,
        kind: OperationKind,
        priority: SyncPriority,
        payload: T,
    ) -> Result<OperationId> {
        if self.operations.len() >= self.config.capacity {
            return Err(Error::OutboxFull {
                capacity: self.config.capacity,
            });
        }

        let id = self.next_id;
        self.next_id += 1;
        let entity_id = entity_id.into();
        tracing::debug!(id, %entity_type, %entity_id, %priority, "Enqueued sync operation");

        self.operations.push(PendingOperation {
            id,
            entity_type,
            entity_id,
            kind,
            priority,
            payload,
            retry: RetryPolicy::with_config(self.retry_config),
        });
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn get(&self, id: OperationId) -> Option<&PendingOperation<T>> {
        self.operations.iter().find(|operation| operation.id == id)
    }

    /// All pending operations in dequeue order
    pub fn ordered(&self) -> Vec<&PendingOperation<T>> {
        let mut ordered: Vec<_> = self.operations.iter().collect();
        ordered.sort_by(|a, b| compare_pending(a, b));
        ordered
    }

    /// Whether an attempt for the given entity is currently running
    pub fn is_in_flight(&self, entity_type: SyncEntityType, entity_id: &str) -> bool {
        self.in_flight
            .contains_key(&(entity_type, entity_id.to_string()))
    }

    /// First operation in dequeue order that may be attempted at `now`.
    ///
    /// Skips operations still backing off, operations whose entity already
    /// has an attempt in flight, and operations queued behind an earlier
    /// operation for the same entity.
    pub fn next_ready(&self, now: DateTime<Utc>) -> Option<&PendingOperation<T>> {
        self.ordered().into_iter().find(|operation| {
            operation.retry.can_retry_now(now)
                && !self.is_in_flight(operation.entity_type, &operation.entity_id)
                && !self.has_earlier_for_entity(operation)
        })
    }

    /// Whether an operation enqueued before `operation` targets the same entity
    fn has_earlier_for_entity(&self, operation: &PendingOperation<T>) -> bool {
        self.operations.iter().any(|other| {
            other.id < operation.id
                && other.entity_type == operation.entity_type
                && other.entity_id == operation.entity_id
        })
    }

    /// Mark an operation's entity as having an attempt in flight.
    pub fn begin(&mut self, id: OperationId) -> Result<()> {
        let operation = self.get(id).ok_or(Error::UnknownOperation(id))?;
        let key = (operation.entity_type, operation.entity_id.clone());
        match self.in_flight.get(&key) {
            Some(&current) if current != id => Err(Error::EntityInFlight {
                entity: format!("{}:{}", key.0, key.1),
                operation: current,
            }),
            _ => {
                self.in_flight.insert(key, id);
                Ok(())
            }
        }
    }

    /// Confirm successful delivery: resets the retry policy and removes the
    /// operation.
    pub fn complete(&mut self, id: OperationId) -> Result<PendingOperation<T>> {
        let mut operation = self.take(id)?;
        operation.retry.reset();
        tracing::debug!(id, entity_id = %operation.entity_id, "Sync operation completed");
        Ok(operation)
    }

    /// Record a failed attempt made at `now`.
    pub fn fail(
        &mut self,
        id: OperationId,
        error: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<FailureOutcome<T>> {
        let index = self.index_of(id)?;
        self.release(id);

        let operation = &mut self.operations[index];
        operation.retry.record_failure_at(error, now);
        if !operation.retry.should_give_up() {
            return Ok(FailureOutcome::RetryAfter(operation.retry.next_retry_delay()));
        }

        let operation = self.operations.remove(index);
        tracing::info!(
            id,
            entity_type = %operation.entity_type,
            entity_id = %operation.entity_id,
            attempts = operation.retry.attempt_count(),
            last_error = operation.retry.last_error().unwrap_or_default(),
            "Giving up on sync operation"
        );
        Ok(FailureOutcome::Abandoned(operation))
    }

    /// Drop an operation without attempting it again.
    pub fn remove(&mut self, id: OperationId) -> Option<PendingOperation<T>> {
        self.take(id).ok()
    }

    fn take(&mut self, id: OperationId) -> Result<PendingOperation<T>> {
        let index = self.index_of(id)?;
        self.release(id);
        Ok(self.operations.remove(index))
    }

    fn index_of(&self, id: OperationId) -> Result<usize> {
        self.operations
            .iter()
            .position(|operation| operation.id == id)
            .ok_or(Error::UnknownOperation(id))
    }

    fn release(&mut self, id: OperationId) {
        self.in_flight.retain(|_, current| *current != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    fn outbox_with_capacity(capacity: usize) -> SyncOutbox<&'static str> {
        let config = SyncConfig {
            outbox: OutboxConfig { capacity },
            ..SyncConfig::default()
        };
        SyncOutbox::new(&config)
    }

    fn priorities(outbox: &SyncOutbox<&'static str>) -> Vec<SyncPriority> {
        outbox
            .ordered()
            .into_iter()
            .map(|operation| operation.priority)
            .collect()
    }

    #[test]
    fn dequeues_by_priority_tier() {
        let mut outbox = SyncOutbox::default();
        for (entity, priority) in [
            ("a", SyncPriority::Low),
            ("b", SyncPriority::Critical),
            ("c", SyncPriority::Normal),
            ("d", SyncPriority::High),
        ] {
            outbox
                .enqueue_with_priority(
                    SyncEntityType::Task,
                    entity,
                    OperationKind::Update,
                    priority,
                    "payload",
                )
                .unwrap();
        }

        assert_eq!(
            priorities(&outbox),
            vec![
                SyncPriority::Critical,
                SyncPriority::High,
                SyncPriority::Normal,
                SyncPriority::Low
            ]
        );
    }

    #[test]
    fn same_tier_keeps_enqueue_order() {
        let mut outbox = SyncOutbox::default();
        let first = outbox
            .enqueue(SyncEntityType::Task, "t1", OperationKind::Update, "first")
            .unwrap();
        outbox
            .enqueue(SyncEntityType::Task, "t2", OperationKind::Create, "create")
            .unwrap();
        let second = outbox
            .enqueue(SyncEntityType::Comment, "c1", OperationKind::Update, "second")
            .unwrap();

        let order: Vec<_> = outbox.ordered().into_iter().map(|op| op.payload).collect();
        assert_eq!(order, vec!["create", "first", "second"]);
        assert!(first < second);
    }

    #[test]
    fn rejects_enqueue_at_capacity() {
        let mut outbox = outbox_with_capacity(1);
        outbox
            .enqueue(SyncEntityType::Task, "t1", OperationKind::Update, "x")
            .unwrap();
        let error = outbox
            .enqueue(SyncEntityType::Task, "t2", OperationKind::Update, "y")
            .unwrap_err();
        assert!(matches!(error, Error::OutboxFull { capacity: 1 }));
    }

    #[test]
    fn in_flight_entity_is_skipped() {
        let mut outbox = SyncOutbox::default();
        let toggle = outbox
            .enqueue(SyncEntityType::Task, "t1", OperationKind::ToggleCompletion, "toggle")
            .unwrap();
        outbox
            .enqueue(SyncEntityType::Task, "t1", OperationKind::Update, "rename")
            .unwrap();
        let other = outbox
            .enqueue(SyncEntityType::Task, "t2", OperationKind::Update, "other")
            .unwrap();

        assert_eq!(outbox.next_ready(at(0)).map(|op| op.id), Some(toggle));
        outbox.begin(toggle).unwrap();
        assert!(outbox.is_in_flight(SyncEntityType::Task, "t1"));
        assert_eq!(outbox.next_ready(at(0)).map(|op| op.id), Some(other));
    }

    #[test]
    fn later_operation_waits_for_backing_off_earlier_one() {
        let mut outbox = SyncOutbox::default();
        let create = outbox
            .enqueue(SyncEntityType::Task, "t1", OperationKind::Create, "create")
            .unwrap();
        let update = outbox
            .enqueue(SyncEntityType::Task, "t1", OperationKind::Update, "update")
            .unwrap();

        outbox.begin(create).unwrap();
        outbox.fail(create, "offline", at(0)).unwrap();
        assert!(outbox.next_ready(at(0)).is_none());

        assert_eq!(outbox.next_ready(at(2)).map(|op| op.id), Some(create));
        outbox.begin(create).unwrap();
        outbox.complete(create).unwrap();
        assert_eq!(outbox.next_ready(at(2)).map(|op| op.id), Some(update));
    }

    #[test]
    fn earlier_operation_gates_entity_even_with_lower_priority() {
        let mut outbox = SyncOutbox::default();
        let create = outbox
            .enqueue(SyncEntityType::Task, "t1", OperationKind::Create, "create")
            .unwrap();
        outbox
            .enqueue(SyncEntityType::Task, "t1", OperationKind::ToggleCompletion, "toggle")
            .unwrap();

        assert_eq!(outbox.next_ready(at(0)).map(|op| op.id), Some(create));
    }

    #[test]
    fn begin_rejects_second_attempt_for_same_entity() {
        let mut outbox = SyncOutbox::default();
        let first = outbox
            .enqueue(SyncEntityType::Task, "t1", OperationKind::Update, "a")
            .unwrap();
        let second = outbox
            .enqueue(SyncEntityType::Task, "t1", OperationKind::Update, "b")
            .unwrap();

        outbox.begin(first).unwrap();
        let error = outbox.begin(second).unwrap_err();
        assert!(matches!(error, Error::EntityInFlight { operation, .. } if operation == first));
        assert!(matches!(outbox.begin(99), Err(Error::UnknownOperation(99))));
    }

    #[test]
    fn failed_operation_backs_off_then_becomes_ready() {
        let mut outbox = SyncOutbox::default();
        let id = outbox
            .enqueue(SyncEntityType::Task, "t1", OperationKind::Update, "x")
            .unwrap();
        outbox.begin(id).unwrap();

        let outcome = outbox.fail(id, "connection reset", at(10)).unwrap();
        assert_eq!(outcome, FailureOutcome::RetryAfter(Duration::from_secs(2)));
        assert!(!outbox.is_in_flight(SyncEntityType::Task, "t1"));
        assert!(outbox.next_ready(at(11)).is_none());
        assert_eq!(outbox.next_ready(at(12)).map(|op| op.id), Some(id));
    }

    #[test]
    fn complete_resets_and_removes() {
        let mut outbox = SyncOutbox::default();
        let id = outbox
            .enqueue(SyncEntityType::Comment, "c1", OperationKind::Create, "x")
            .unwrap();
        outbox.fail(id, "timeout", at(0)).unwrap();
        outbox.begin(id).unwrap();

        let done = outbox.complete(id).unwrap();
        assert_eq!(done.retry.attempt_count(), 0);
        assert_eq!(done.retry.last_error(), None);
        assert!(outbox.is_empty());
        assert!(!outbox.is_in_flight(SyncEntityType::Comment, "c1"));
    }

    #[test]
    fn abandons_after_max_attempts() {
        let config = SyncConfig {
            retry: RetryConfig {
                max_attempts: 3,
                ..RetryConfig::default()
            },
            ..SyncConfig::default()
        };
        let mut outbox = SyncOutbox::new(&config);
        let id = outbox
            .enqueue(SyncEntityType::Attachment, "a1", OperationKind::Attachment, "blob")
            .unwrap();

        assert!(matches!(
            outbox.fail(id, "413", at(0)).unwrap(),
            FailureOutcome::RetryAfter(_)
        ));
        assert!(matches!(
            outbox.fail(id, "413", at(10)).unwrap(),
            FailureOutcome::RetryAfter(_)
        ));
        let FailureOutcome::Abandoned(operation) = outbox.fail(id, "413", at(20)).unwrap() else {
            panic!("expected operation to be abandoned");
        };
        assert_eq!(operation.retry.attempt_count(), 3);
        assert_eq!(operation.retry.last_error(), Some("413"));
        assert!(outbox.is_empty());
        assert!(matches!(
            outbox.fail(id, "413", at(30)),
            Err(Error::UnknownOperation(_))
        ));
    }

    #[test]
    fn remove_drops_operation() {
        let mut outbox = SyncOutbox::default();
        let id = outbox
            .enqueue(SyncEntityType::Task, "t1", OperationKind::Delete, "x")
            .unwrap();
        assert_eq!(outbox.remove(id).map(|op| op.kind), Some(OperationKind::Delete));
        assert!(outbox.remove(id).is_none());
    }
}
