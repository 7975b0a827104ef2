//! Storage error types
//!
//! Defines all errors that can occur in the point stores.

use thiserror::Error;

/// Errors that can occur in a point store
#[derive(Error, Debug)]
pub enum StorageError {
    /// SQLite statement or connection failed
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Tags or fields column could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Blocking task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
