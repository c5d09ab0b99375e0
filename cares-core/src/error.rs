//! Error types for the cares ecosystem.

use thiserror::Error;

/// Errors that can occur in cares operations.
#[derive(Error, Debug)]
pub enum CaresError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not read events file: {0}")]
    StorageRead(String),

    #[error("Could not write events file: {0}")]
    StorageWrite(String),

    #[error("{0}")]
    Validation(String),

    #[error("Incorrect password")]
    Auth,

    #[error("Please log in first")]
    NotLoggedIn,

    #[error("Event not found: {0}")]
    EventNotFound(u64),

    #[error("No event ids left after {0}")]
    IdsExhausted(u64),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Notification timed out after {0}s")]
    NotificationTimeout(u64),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for cares operations.
pub type CaresResult<T> = Result<T, CaresError>;
