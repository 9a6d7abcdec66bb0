//! Sync engine configuration.
//!
//! `SyncConfig` carries the retry schedule and outbox limits. Every field has
//! a default, so an empty JSON object (or a missing file) yields a usable
//! configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
const DEFAULT_MAX_DELAY_MS: u64 = 32_000;
const DEFAULT_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_OUTBOX_CAPACITY: usize = 1_024;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub outbox: OutboxConfig,
}

/// Exponential backoff parameters for a single outbound operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Delay before the first retry, doubled per recorded failure
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound on any single delay
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Failures after which the operation is abandoned
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct OutboxConfig {
    /// Maximum number of pending operations held at once
    #[serde(default = "default_outbox_capacity")]
    pub capacity: usize,
}

const fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}

const fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}

const fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

const fn default_outbox_capacity() -> usize {
    DEFAULT_OUTBOX_CAPACITY
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_OUTBOX_CAPACITY,
        }
    }
}

impl RetryConfig {
    pub const fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub const fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.base_delay_ms == 0 {
            return Err(Error::InvalidConfig(
                "retry.base_delay_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err(Error::InvalidConfig(format!(
                "retry.max_delay_ms ({}) must not be below retry.base_delay_ms ({})",
                self.max_delay_ms, self.base_delay_ms
            )));
        }
        if self.max_attempts == 0 {
            return Err(Error::InvalidConfig(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl SyncConfig {
    /// Parse and validate a configuration from a raw JSON payload.
    pub fn parse(payload: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(payload)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, falling back to defaults when it does not
    /// exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        self.retry.validate()?;
        if self.outbox.capacity == 0 {
            return Err(Error::InvalidConfig(
                "outbox.capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_yields_defaults() {
        let config = SyncConfig::parse("{}").unwrap();
        assert_eq!(config, SyncConfig::default());
        assert_eq!(config.retry.base_delay(), Duration::from_secs(1));
        assert_eq!(config.retry.max_delay(), Duration::from_secs(32));
        assert_eq!(config.retry.max_attempts, 10);
        assert_eq!(config.outbox.capacity, 1_024);
    }

    #[test]
    fn partial_retry_section_keeps_other_defaults() {
        let config = SyncConfig::parse(r#"{ "retry": { "max_attempts": 3 } }"#).unwrap();
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 1_000);
    }

    #[test]
    fn rejects_unknown_fields() {
        let error = SyncConfig::parse(r#"{ "retry": { "jitter_ms": 5 } }"#).unwrap_err();
        assert!(error.to_string().contains("unknown field"));
    }

    #[test]
    fn rejects_max_delay_below_base() {
        let error = SyncConfig::parse(
            r#"{ "retry": { "base_delay_ms": 5000, "max_delay_ms": 1000 } }"#,
        )
        .unwrap_err();
        assert!(matches!(error, Error::InvalidConfig(_)));
    }

    #[test]
    fn rejects_zero_capacity() {
        let error = SyncConfig::parse(r#"{ "outbox": { "capacity": 0 } }"#).unwrap_err();
        assert!(error.to_string().contains("outbox.capacity"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SyncConfig::load_from_path(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, SyncConfig::default());
    }

    #[test]
    fn loads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "outbox": { "capacity": 8 } }"#).unwrap();

        let config = SyncConfig::load_from_path(&path).unwrap();
        assert_eq!(config.outbox.capacity, 8);
    }
}
