//! Core error types for pomodorotec-core.
//!
//! The phase scheduler itself never fails: invalid command sequences map onto
//! well-defined transitions. Errors only come from the edges of the library
//! (configuration files, command parsing, notification rendering, and the
//! absence of an async runtime).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomodorotec-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An external command could not be understood
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// The scheduler needs a tokio runtime to drive its tick source
    #[error("No tokio runtime available to drive the phase scheduler")]
    NoRuntime,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Errors raised while translating external action names into commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),
}

/// Failures reported by a notification collaborator.
///
/// These never propagate into scheduler state.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Notifications are switched off (e.g. permission denied)
    #[error("notifications are disabled")]
    Disabled,

    /// The rendering backend refused the notification
    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
