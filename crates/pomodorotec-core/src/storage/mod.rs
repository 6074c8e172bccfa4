mod config;

pub use config::{Config, LoggingConfig, NotificationsConfig, SchedulerConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/pomodorotec[-dev]/` based on POMODOROTEC_ENV.
///
/// Set POMODOROTEC_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMODOROTEC_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomodorotec-dev")
    } else {
        base_dir.join("pomodorotec")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::SaveFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
