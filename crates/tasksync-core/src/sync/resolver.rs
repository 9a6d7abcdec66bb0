//! Conflict detection and field-level merge.
//!
//! A conflict exists when the local and server snapshots of a task both carry
//! an `updatedAt` and the two differ. Without a conflict the server copy is
//! taken as is. With one, the merge starts from the server copy and applies
//! each field rule independently:
//!
//! | Fields                         | Rule                                        |
//! |--------------------------------|---------------------------------------------|
//! | `completed`                    | local wins only when it completes the task  |
//! | `title`, `description`         | most recent wins (strictly newer local)     |
//! | `dueDateTime` + `isAllDay`     | most recent wins, as a pair                 |
//! | `priority`                     | most recent wins                            |
//! | lists, assignees, attachments, comments, everything else | server wins |
//!
//! Comments are merged separately by [`ConflictResolver::resolve_comment_conflicts`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::models::{Comment, CommentId, ConflictRecord, MergeRule, Task};
use crate::util::latest_timestamp;

/// Stateless resolver for divergent task and comment snapshots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConflictResolver;

/// Outcome of resolving a task pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResolution {
    /// Snapshot to persist locally
    pub task: Task,
    /// Present when the pair was in conflict
    pub conflict: Option<ConflictRecord>,
}

impl TaskResolution {
    /// Whether local values survived, so the resolved task must be sent to
    /// the server again.
    pub fn needs_upload(&self) -> bool {
        self.conflict
            .as_ref()
            .is_some_and(|record| !record.server_won())
    }
}

/// Inputs shared by every field rule
struct MergeContext<'a> {
    local: &'a Task,
    server: &'a Task,
    local_is_newer: bool,
}

/// A field rule takes the snapshot built so far and returns it, replacing its
/// own fields when the local value should win.
type FieldRule = fn(&MergeContext<'_>, Task) -> (Task, bool);

const FIELD_RULES: [(MergeRule, FieldRule); 5] = [
    (MergeRule::Completion, completion_rule),
    (MergeRule::Title, title_rule),
    (MergeRule::Description, description_rule),
    (MergeRule::Due, due_rule),
    (MergeRule::Priority, priority_rule),
];

impl ConflictResolver {
    pub const fn new() -> Self {
        Self
    }

    /// Whether the two snapshots diverged.
    ///
    /// Compares `updatedAt` only. Missing timestamps on either side mean
    /// divergence cannot be established, so no conflict is reported.
    pub fn has_conflict(&self, local: &Task, server: &Task) -> bool {
        timestamps_diverge(local.updated_at, server.updated_at)
    }

    /// Resolve a task pair using the current time as merge time.
    pub fn resolve_task_conflict(&self, local: &Task, server: &Task) -> Task {
        self.resolve_task_conflict_at(local, server, Utc::now())
    }

    pub fn resolve_task_conflict_at(
        &self,
        local: &Task,
        server: &Task,
        merge_time: DateTime<Utc>,
    ) -> Task {
        self.resolve_task(local, server, merge_time).task
    }

    /// Like [`Self::resolve_task_conflict`], but rejects snapshots that do
    /// not describe the same task.
    pub fn try_resolve_task_conflict(&self, local: &Task, server: &Task) -> Result<Task> {
        Ok(self.try_resolve_task(local, server, Utc::now())?.task)
    }

    /// Checked variant of [`Self::resolve_task`]: `id` must match, and so
    /// must `createdAt` when both sides carry one.
    pub fn try_resolve_task(
        &self,
        local: &Task,
        server: &Task,
        merge_time: DateTime<Utc>,
    ) -> Result<TaskResolution> {
        ensure_same_task(local, server)?;
        Ok(self.resolve_task(local, server, merge_time))
    }

    /// Resolve a task pair and report which rules kept local values.
    pub fn resolve_task(
        &self,
        local: &Task,
        server: &Task,
        merge_time: DateTime<Utc>,
    ) -> TaskResolution {
        let (Some(local_updated_at), Some(server_updated_at)) =
            (local.updated_at, server.updated_at)
        else {
            tracing::trace!(task_id = %server.id, "Missing updatedAt, keeping server copy");
            return TaskResolution {
                task: server.clone(),
                conflict: None,
            };
        };
        if local_updated_at == server_updated_at {
            return TaskResolution {
                task: server.clone(),
                conflict: None,
            };
        }

        let context = MergeContext {
            local,
            server,
            local_is_newer: local_updated_at > server_updated_at,
        };
        // The result must never look older than either input, even when the
        // merging device's clock lags behind.
        let stamp = latest_timestamp([Some(merge_time), local.updated_at, server.updated_at])
            .unwrap_or(merge_time);

        let mut merged = server.clone();
        let mut applied = Vec::new();
        for (rule, apply) in FIELD_RULES {
            let (next, changed) = apply(&context, merged);
            merged = if changed {
                applied.push(rule);
                next.with_updated_at(Some(stamp))
            } else {
                next
            };
        }
        if applied.is_empty() {
            merged = merged.with_updated_at(Some(local_updated_at.max(server_updated_at)));
        }

        tracing::debug!(
            task_id = %server.id,
            %local_updated_at,
            %server_updated_at,
            rules = ?applied,
            "Resolved task conflict"
        );

        let record = ConflictRecord {
            task_id: server.id.clone(),
            local_updated_at,
            server_updated_at,
            resolved_at: merged.updated_at.unwrap_or(stamp),
            applied,
        };
        TaskResolution {
            task: merged,
            conflict: Some(record),
        }
    }

    /// Merge local and server comment lists for one task.
    ///
    /// Server comments are authoritative unless the local copy of the same
    /// comment is strictly newer. Local comments unknown to the server are
    /// kept only when their id is pending-local; any other such comment was
    /// deleted on the server and is dropped. The result is ordered by
    /// `createdAt`, missing values first.
    pub fn resolve_comment_conflicts(&self, local: &[Comment], server: &[Comment]) -> Vec<Comment> {
        let mut merged: Vec<Comment> = Vec::with_capacity(server.len() + local.len());
        let mut index: HashMap<CommentId, usize> = HashMap::new();

        for comment in server {
            upsert(&mut merged, &mut index, comment.clone());
        }

        for comment in local {
            match index.get(&comment.id).copied() {
                Some(position) => {
                    if comment.last_modified() > merged[position].last_modified() {
                        merged[position] = comment.clone();
                    }
                }
                None if comment.id.is_pending_local() => {
                    upsert(&mut merged, &mut index, comment.clone());
                }
                None => {
                    tracing::trace!(comment_id = %comment.id, "Dropping comment deleted on server");
                }
            }
        }

        merged.sort_by_key(Comment::created_or_earliest);
        merged
    }
}

/// `updatedAt` divergence test shared by conflict detection
fn timestamps_diverge(local: Option<DateTime<Utc>>, server: Option<DateTime<Utc>>) -> bool {
    match (local, server) {
        (Some(local), Some(server)) => local != server,
        _ => false,
    }
}

fn ensure_same_task(local: &Task, server: &Task) -> Result<()> {
    if local.id != server.id {
        return Err(Error::IdentityMismatch {
            field: "id",
            local: local.id.to_string(),
            server: server.id.to_string(),
        });
    }
    if let (Some(local_created), Some(server_created)) = (local.created_at, server.created_at) {
        if local_created != server_created {
            return Err(Error::IdentityMismatch {
                field: "createdAt",
                local: local_created.to_rfc3339(),
                server: server_created.to_rfc3339(),
            });
        }
    }
    Ok(())
}

fn upsert(merged: &mut Vec<Comment>, index: &mut HashMap<CommentId, usize>, comment: Comment) {
    if let Some(&position) = index.get(&comment.id) {
        merged[position] = comment;
    } else {
        index.insert(comment.id.clone(), merged.len());
        merged.push(comment);
    }
}

/// Most-recent-wins test: local must be strictly newer and actually differ
fn local_wins<V: PartialEq>(context: &MergeContext<'_>, local: &V, server: &V) -> bool {
    context.local_is_newer && local != server
}

fn completion_rule(context: &MergeContext<'_>, base: Task) -> (Task, bool) {
    // Completing beats un-completing, regardless of recency
    if context.local.completed && !context.server.completed {
        (base.with_completed(true), true)
    } else {
        (base, false)
    }
}

fn title_rule(context: &MergeContext<'_>, base: Task) -> (Task, bool) {
    if local_wins(context, &context.local.title, &context.server.title) {
        (base.with_title(context.local.title.clone()), true)
    } else {
        (base, false)
    }
}

fn description_rule(context: &MergeContext<'_>, base: Task) -> (Task, bool) {
    if local_wins(context, &context.local.description, &context.server.description) {
        (base.with_description(context.local.description.clone()), true)
    } else {
        (base, false)
    }
}

fn due_rule(context: &MergeContext<'_>, base: Task) -> (Task, bool) {
    if local_wins(context, &context.local.due, &context.server.due) {
        (base.with_due(context.local.due), true)
    } else {
        (base, false)
    }
}

fn priority_rule(context: &MergeContext<'_>, base: Task) -> (Task, bool) {
    if local_wins(context, &context.local.priority, &context.server.priority) {
        (base.with_priority(context.local.priority), true)
    } else {
        (base, false)
    }
}
