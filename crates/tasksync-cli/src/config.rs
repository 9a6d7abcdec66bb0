//! Config file discovery for the CLI.

use std::path::PathBuf;

use tasksync_core::util::normalize_text_option;
use tasksync_core::SyncConfig;

use crate::error::CliError;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKSYNC_CONFIG";

/// Load the sync config, resolving its path from the flag, then the
/// environment, then the platform config directory.
pub fn load_config(explicit: Option<PathBuf>) -> Result<SyncConfig, CliError> {
    let path = resolve_config_path(
        explicit,
        std::env::var(CONFIG_ENV_VAR).ok(),
        dirs::config_dir(),
    );
    tracing::debug!("Loading sync config from {}", path.display());
    Ok(SyncConfig::load_from_path(&path)?)
}

pub fn resolve_config_path(
    explicit: Option<PathBuf>,
    env_value: Option<String>,
    config_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    if let Some(path) = normalize_text_option(env_value) {
        return PathBuf::from(path);
    }
    config_dir.map_or_else(
        || PathBuf::from(format!("tasksync-{CONFIG_FILE_NAME}")),
        |dir| dir.join("tasksync").join(CONFIG_FILE_NAME),
    )
}
