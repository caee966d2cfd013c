//! Error types for configuration operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO failures while reading or writing the configuration file.
    #[error("config {operation} failed for '{}'", path.display())]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// JSON parsing or serialization failures.
    #[error("config {operation} failed for '{}'", path.display())]
    Json {
        /// Operation that triggered the JSON failure.
        operation: &'static str,
        /// Path involved in the JSON failure.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// Refused to overwrite an existing configuration file.
    #[error("config file '{}' already exists", path.display())]
    AlreadyExists {
        /// Path of the existing file.
        path: PathBuf,
    },
    /// Neither `x_api_key` nor `roblosecurity` was provided.
    #[error("no credentials configured (set x_api_key or roblosecurity)")]
    MissingCredentials,
    /// Field contained an invalid value.
    #[error("invalid configuration field '{field}': {reason}")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
}

impl ConfigError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: serde_json::Error,
    ) -> Self {
        Self::Json {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_field(
        field: &'static str,
        reason: &'static str,
        value: Option<&str>,
    ) -> Self {
        Self::InvalidField {
            field,
            reason,
            value: value.map(str::to_string),
        }
    }
}
