use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tasksync_core::util::format_timestamp;
use tasksync_core::{ConflictRecord, ConflictResolver, Task, TaskResolution};

use crate::commands::common::{print_json, print_lines, read_json_file, yes_no};
use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionItem<'a> {
    pub task: &'a Task,
    pub conflict: Option<&'a ConflictRecord>,
    pub needs_upload: bool,
}

pub fn run_resolve_task(
    local_path: &Path,
    server_path: &Path,
    merge_time: Option<DateTime<Utc>>,
    as_json: bool,
) -> Result<(), CliError> {
    let local: Task = read_json_file(local_path)?;
    let server: Task = read_json_file(server_path)?;
    let resolution = resolve_task_pair(&local, &server, merge_time.unwrap_or_else(Utc::now))?;

    if as_json {
        print_json(&resolution_to_item(&resolution))
    } else {
        print_lines(&format_resolution_lines(&resolution));
        Ok(())
    }
}

pub fn resolve_task_pair(
    local: &Task,
    server: &Task,
    merge_time: DateTime<Utc>,
) -> Result<TaskResolution, CliError> {
    Ok(ConflictResolver::new().try_resolve_task(local, server, merge_time)?)
}

pub fn resolution_to_item(resolution: &TaskResolution) -> ResolutionItem<'_> {
    ResolutionItem {
        task: &resolution.task,
        conflict: resolution.conflict.as_ref(),
        needs_upload: resolution.needs_upload(),
    }
}

pub fn format_resolution_lines(resolution: &TaskResolution) -> Vec<String> {
    let task = &resolution.task;
    let mut lines = vec![format!("task {}  \"{}\"", task.id, task.title)];

    match &resolution.conflict {
        None => lines.push("conflict: no (server copy kept)".to_string()),
        Some(record) => {
            lines.push(format!(
                "conflict: yes  local={}  server={}",
                format_timestamp(Some(record.local_updated_at)),
                format_timestamp(Some(record.server_updated_at))
            ));
            let rules = if record.server_won() {
                "none".to_string()
            } else {
                record
                    .applied
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            lines.push(format!("local values kept: {rules}"));
        }
    }

    lines.push(format!(
        "completed: {}  priority: {:?}  updated: {}",
        yes_no(task.completed),
        task.priority,
        format_timestamp(task.updated_at)
    ));
    lines.push(format!("needs upload: {}", yes_no(resolution.needs_upload())));
    lines
}
