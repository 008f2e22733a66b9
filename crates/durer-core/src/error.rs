//! Core error types for durer-core.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for durer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Saved-state store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Share/resolve errors
    #[error("Share error: {0}")]
    Share(#[from] ShareError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Saved-state store errors.
///
/// `UnknownId` and `ActiveEntry` are logic faults -- they signal caller
/// misuse, not an environmental failure, and are never swallowed.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Update target does not exist (creation is a separate operation)
    #[error("no saved timer with id '{0}'")]
    UnknownId(String),

    /// Deleting the entry the live timer is synced to
    #[error("saved timer '{0}' is active and cannot be deleted")]
    ActiveEntry(String),

    /// The full-set rewrite to durable storage failed
    #[error("failed to write saved timers to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize saved timers: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("failed to resolve the data directory: {0}")]
    DataDir(String),
}

/// Share/load resolver errors.
///
/// A missing share code is NOT an error -- `resolve` returns `Ok(None)` for
/// 404 so callers can tell "invalid code" from the faults below.
#[derive(Error, Debug)]
pub enum ShareError {
    /// A custom share code was given but blank
    #[error("share code cannot be empty")]
    EmptyId,

    /// The configured base URL or a derived request URL is malformed
    #[error("invalid share URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The remote store answered with a non-success status (other than 404)
    #[error("remote store returned HTTP {status}")]
    Server { status: reqwest::StatusCode },

    /// The remote store could not be reached at all
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
