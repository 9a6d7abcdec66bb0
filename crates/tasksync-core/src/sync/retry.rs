//! Exponential backoff for a single outbound sync operation.
//!
//! A `RetryPolicy` moves through `Idle(0) -> Failed(1) -> ... ->
//! Failed(max_attempts)`, where the last state means "give up". `reset`
//! returns it to `Idle(0)` from anywhere.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RetryConfig;

/// Retry state of one pending operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    config: RetryConfig,
    attempt_count: u32,
    last_attempt_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_config(RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_config(config: RetryConfig) -> Self {
        Self {
            config,
            attempt_count: 0,
            last_attempt_at: None,
            last_error: None,
        }
    }

    pub const fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub const fn last_attempt_at(&self) -> Option<DateTime<Utc>> {
        self.last_attempt_at
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub const fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// `min(base * 2^attempt_count, max)`
    pub fn next_retry_delay(&self) -> Duration {
        delay_for_attempt(&self.config, self.attempt_count)
    }

    pub const fn should_give_up(&self) -> bool {
        self.attempt_count >= self.config.max_attempts
    }

    /// Earliest instant the next attempt is allowed, if a failure was recorded
    pub fn next_retry_at(&self) -> Option<DateTime<Utc>> {
        let last = self.last_attempt_at?;
        let delay = chrono::Duration::from_std(self.next_retry_delay()).ok()?;
        last.checked_add_signed(delay)
    }

    pub fn can_retry_now(&self, now: DateTime<Utc>) -> bool {
        if self.should_give_up() {
            return false;
        }
        let Some(last) = self.last_attempt_at else {
            return true;
        };
        // a clock that moved backwards yields a negative span, which never qualifies
        now.signed_duration_since(last)
            .to_std()
            .is_ok_and(|elapsed| elapsed >= self.next_retry_delay())
    }

    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.record_failure_at(error, Utc::now());
    }

    /// Record a failed attempt made at `now`.
    ///
    /// The attempt count saturates at `max_attempts`: once the policy has
    /// given up, further failures only refresh the timestamp and error.
    pub fn record_failure_at(&mut self, error: impl Into<String>, now: DateTime<Utc>) {
        let error = error.into();
        if self.should_give_up() {
            tracing::warn!(
                attempts = self.attempt_count,
                "Failure recorded on exhausted retry policy: {error}"
            );
        } else {
            self.attempt_count += 1;
        }
        self.last_attempt_at = Some(now);
        self.last_error = Some(error);
    }

    pub fn reset(&mut self) {
        self.attempt_count = 0;
        self.last_attempt_at = None;
        self.last_error = None;
    }
}

/// Backoff delay after `attempt` recorded failures
pub fn delay_for_attempt(config: &RetryConfig, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    config
        .base_delay()
        .saturating_mul(factor)
        .min(config.max_delay())
}
