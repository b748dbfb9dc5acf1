//! Error types shared across the service.

use thiserror::Error;

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {key}")]
    MissingVar { key: String },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Storage backend failures.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("database operation failed: {0}")]
    Query(String),

    #[error("stored record could not be decoded: {0}")]
    Decode(String),
}

impl From<mongodb::error::Error> for DatabaseError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Query(err.to_string())
    }
}

/// HTTP server lifecycle failures.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to start {name}: {reason}")]
    StartupFailed { name: String, reason: String },
}
