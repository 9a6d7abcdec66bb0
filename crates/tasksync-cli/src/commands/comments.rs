use std::path::Path;

use tasksync_core::util::format_timestamp;
use tasksync_core::{Comment, ConflictResolver};

use crate::commands::common::{print_json, print_lines, read_json_file, text_preview};
use crate::error::CliError;

const PREVIEW_LEN: usize = 48;

pub fn run_merge_comments(
    local_path: &Path,
    server_path: &Path,
    as_json: bool,
) -> Result<(), CliError> {
    let local: Vec<Comment> = read_json_file(local_path)?;
    let server: Vec<Comment> = read_json_file(server_path)?;
    let merged = ConflictResolver::new().resolve_comment_conflicts(&local, &server);

    if as_json {
        return print_json(&merged);
    }

    if merged.is_empty() {
        println!("No comments.");
        return Ok(());
    }
    print_lines(&format_comment_lines(&merged));
    Ok(())
}

pub fn format_comment_lines(comments: &[Comment]) -> Vec<String> {
    comments
        .iter()
        .map(|comment| {
            let marker = if comment.id.is_pending_local() {
                " (pending)"
            } else {
                ""
            };
            format!(
                "{}  {}{}  {}",
                format_timestamp(comment.created_at),
                comment.id,
                marker,
                text_preview(&comment.text, PREVIEW_LEN)
            )
        })
        .collect()
}
