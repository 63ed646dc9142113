//! Core error types for homeboard-core.
//!
//! The store engine and the timer reconciler are total and never return
//! these. Only persistence I/O, configuration files and the insights
//! boundary can fail. Insight failures are folded into
//! [`InsightOutcome`](crate::insights::InsightOutcome); the rest surface to
//! shells as [`CoreError`].

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for homeboard-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistence-related errors
    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An instant that is not RFC 3339
    #[error("Invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors raised by a [`StoreBackend`](crate::store::StoreBackend).
#[derive(Error, Debug)]
pub enum PersistError {
    /// Failed to open the backing database
    #[error("Failed to open store database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Store database is locked")]
    Locked,

    /// Data directory could not be resolved or created
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
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

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Failures at the insights HTTP boundary.
///
/// These never reach UI code directly; [`InsightsClient`](crate::insights::InsightsClient)
/// folds them into [`InsightOutcome::Unavailable`](crate::insights::InsightOutcome).
#[derive(Error, Debug)]
pub enum InsightError {
    /// No endpoint configured
    #[error("Insights endpoint is not configured")]
    NotConfigured,

    /// Transport-level failure (connect, timeout, TLS)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint answered with a non-2xx status
    #[error("Insights endpoint returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body could not be parsed
    #[error("Malformed insights response: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for PersistError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked {
                    PersistError::Locked
                } else {
                    PersistError::QueryFailed(err.to_string())
                }
            }
            _ => PersistError::QueryFailed(err.to_string()),
        }
    }
}

impl From<std::io::Error> for PersistError {
    fn from(err: std::io::Error) -> Self {
        PersistError::DataDir(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
