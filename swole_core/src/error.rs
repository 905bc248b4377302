//! Error types for the swole_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for swole_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Workout type or goal is not present in the catalog
    #[error("Unknown template key: {0}")]
    UnknownTemplateKey(String),

    /// Muscle selection is empty or not valid for the workout type
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// A persisted value could not be parsed.
    ///
    /// Readers recover from this locally; it only surfaces from the
    /// strict parsing helpers.
    #[error("Corrupted log entry at '{key}': {reason}")]
    CorruptedLogEntry { key: String, reason: String },

    /// Session tracker rejected an operation in its current state
    #[error("Session error: {0}")]
    Session(String),

    /// Persistence store error
    #[error("Store error: {0}")]
    Store(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
