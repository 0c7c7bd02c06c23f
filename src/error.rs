//! Error types for the daily mirror.

use thiserror::Error;

/// Common error type for the daily mirror.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Upstream fetch error.
    ///
    /// Covers network failures, non-success HTTP statuses, bodies that are
    /// not JSON and payloads that do not have the expected shape.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// HTML parse error during author extraction.
    #[error("parse error: {0}")]
    Parse(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Database error.
    ///
    /// Errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// RSS feed generation error.
    #[error("RSS error: {0}")]
    Rss(String),
}

impl From<sqlx::Error> for MirrorError {
    fn from(e: sqlx::Error) -> Self {
        MirrorError::Database(e.to_string())
    }
}

/// Result type alias for daily mirror operations.
pub type Result<T> = std::result::Result<T, MirrorError>;
