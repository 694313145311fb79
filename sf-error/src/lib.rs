//! Unified error handling for Synofan
//!
//! This crate provides a single error type used across all Synofan components.
//! It uses thiserror for ergonomic error definitions with proper Display and Error trait impls.
//!
//! [`ErrorKind`] is the coarse classification the reconciler reports on. Only
//! the fatal kinds turn a run into a failure.

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Result type alias using SynofanError
pub type Result<T> = std::result::Result<T, SynofanError>;

/// Coarse classification of a failure as seen by one reconciliation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// One temperature source failed; recovered by falling back to the next one
    SourceUnavailable,
    /// Every temperature source failed; nothing is actuated
    NoTemperatureSource,
    /// The persisted state could not be parsed; treated as unknown
    StateCorrupt,
    /// The fan mode could not be applied; persisted state is left untouched
    ActuationFailed,
    /// The mode was applied but could not be recorded
    PersistFailed,
    /// Anything outside the reconciliation contract (config, I/O, ...)
    Other,
}

impl ErrorKind {
    /// Whether this kind leaves fan control possibly out of sync with intent
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::NoTemperatureSource | Self::ActuationFailed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SourceUnavailable => "SourceUnavailable",
            Self::NoTemperatureSource => "NoTemperatureSource",
            Self::StateCorrupt => "StateCorrupt",
            Self::ActuationFailed => "ActuationFailed",
            Self::PersistFailed => "PersistFailed",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for all Synofan operations
#[derive(thiserror::Error, Debug)]
pub enum SynofanError {
    // ============================================================================
    // I/O and File System Errors
    // ============================================================================
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: io::Error,
    },

    #[error("File too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    #[error("Invalid path {path}: {reason}")]
    InvalidPath {
        path: PathBuf,
        reason: String,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    #[error("Invalid thresholds: quiet_max {quiet_max}°C must be below cool_max {cool_max}°C")]
    InvalidThresholds {
        quiet_max: f32,
        cool_max: f32,
    },

    // ============================================================================
    // Temperature Source Errors
    // ============================================================================
    #[error("Failed to read temperature from {path}: {reason}")]
    TemperatureRead {
        path: PathBuf,
        reason: String,
    },

    #[error("Implausible temperature: {value}°C")]
    ImplausibleTemperature {
        value: f32,
    },

    #[error("Temperature source {source_name} unavailable: {reason}")]
    SourceUnavailable {
        source_name: String,
        reason: String,
    },

    #[error("No temperature source available ({})", .failures.join("; "))]
    NoTemperatureSource {
        failures: Vec<String>,
    },

    // ============================================================================
    // Management API Errors
    // ============================================================================
    #[error("Login failed: {0}")]
    Login(String),

    #[error("API request {api} failed: {reason}")]
    ApiRequest {
        api: String,
        reason: String,
    },

    #[error("API {api} returned error code {code}")]
    ApiStatus {
        api: String,
        code: i64,
    },

    #[error("Malformed response from {api}: {reason}")]
    MalformedResponse {
        api: String,
        reason: String,
    },

    // ============================================================================
    // State and Actuation Errors
    // ============================================================================
    #[error("State file {path} is corrupt: {reason}")]
    StateCorrupt {
        path: PathBuf,
        reason: String,
    },

    #[error("Failed to persist state: {0}")]
    PersistFailed(String),

    #[error("Failed to set fan mode {mode}: {reason}")]
    ActuationFailed {
        mode: String,
        reason: String,
    },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Generic(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl SynofanError {
    /// Create a generic error from a string
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }

    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid config error for a named field
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an API request error
    pub fn api(api: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ApiRequest {
            api: api.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(api: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            api: api.into(),
            reason: reason.into(),
        }
    }

    /// Classify this error for reconciliation reporting
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TemperatureRead { .. }
            | Self::ImplausibleTemperature { .. }
            | Self::SourceUnavailable { .. } => ErrorKind::SourceUnavailable,
            Self::NoTemperatureSource { .. } => ErrorKind::NoTemperatureSource,
            Self::StateCorrupt { .. } => ErrorKind::StateCorrupt,
            Self::ActuationFailed { .. } => ErrorKind::ActuationFailed,
            Self::PersistFailed(_) => ErrorKind::PersistFailed,
            _ => ErrorKind::Other,
        }
    }
}

// Allow converting from String to SynofanError
impl From<String> for SynofanError {
    fn from(s: String) -> Self {
        Self::Generic(s)
    }
}

// Allow converting from &str to SynofanError
impl From<&str> for SynofanError {
    fn from(s: &str) -> Self {
        Self::Generic(s.to_string())
    }
}
