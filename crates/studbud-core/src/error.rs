//! Core error types for studbud-core.
//!
//! Validation failures abort an operation without touching state. Remote
//! generator failures never show up here: they are folded into
//! [`crate::integrations::PlanOutcome`] and resolved by falling back to the
//! allocator.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studbud-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Snapshot storage errors
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// An AI generation request is already running
    #[error("A plan generation request is already in progress")]
    GenerationInProgress,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Snapshot storage errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open database connection
    #[error("Failed to open snapshot store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Snapshot store is locked")]
    Locked,
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

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Time string is not a 24-hour HH:MM value
    #[error("Invalid time '{0}': expected 24-hour HH:MM")]
    InvalidClockTime(String),

    /// Day label is not one of the seven weekdays
    #[error("Unknown day '{0}': expected Monday through Sunday")]
    UnknownDay(String),

    /// Difficulty label is not recognized
    #[error("Unknown difficulty '{0}': expected easy, easyToModerate, moderate, aboveModerate or tough")]
    UnknownDifficulty(String),

    /// Goal label is not recognized
    #[error("Unknown goal '{0}': expected exam, skill, daily or custom")]
    UnknownGoal(String),

    /// Invalid time range
    #[error("Invalid time range: end time ({end}) must be after start time ({start})")]
    InvalidTimeRange { start: String, end: String },

    /// Subject name missing or blank
    #[error("Subject name must not be empty")]
    MissingName,

    /// Empty collection
    #[error("Please add at least one {0}")]
    EmptyCollection(String),

    /// Duplicate identifier
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    /// Referenced entity does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Store(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
