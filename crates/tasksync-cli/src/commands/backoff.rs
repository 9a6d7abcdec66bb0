use serde::Serialize;
use tasksync_core::sync::retry::delay_for_attempt;
use tasksync_core::RetryConfig;

use crate::commands::common::{print_json, print_lines};
use crate::error::CliError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackoffRow {
    /// Failures recorded so far
    pub attempt: u32,
    pub delay_ms: u128,
    pub gives_up: bool,
}

pub fn run_backoff(config: &RetryConfig, as_json: bool) -> Result<(), CliError> {
    let rows = backoff_schedule(config);
    if as_json {
        print_json(&rows)
    } else {
        print_lines(&format_backoff_lines(&rows));
        Ok(())
    }
}

pub fn backoff_schedule(config: &RetryConfig) -> Vec<BackoffRow> {
    (0..=config.max_attempts)
        .map(|attempt| BackoffRow {
            attempt,
            delay_ms: delay_for_attempt(config, attempt).as_millis(),
            gives_up: attempt >= config.max_attempts,
        })
        .collect()
}

pub fn format_backoff_lines(rows: &[BackoffRow]) -> Vec<String> {
    rows.iter()
        .map(|row| {
            if row.gives_up {
                format!("attempt {:>3}  give up", row.attempt)
            } else {
                #[allow(clippy::cast_precision_loss)]
                let seconds = row.delay_ms as f64 / 1_000.0;
                format!("attempt {:>3}  wait {seconds:.3}s", row.attempt)
            }
        })
        .collect()
}
