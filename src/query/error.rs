//! Query error types
//!
//! Defines all error conditions that can occur during query interpretation,
//! aggregation and execution.

use thiserror::Error;

/// Errors that can occur during query operations
#[derive(Error, Debug)]
pub enum QueryError {
    /// A recognized statement is malformed
    #[error("Invalid syntax: {0}")]
    InvalidSyntax(String),

    /// A time bound is not an integer with an optional `ms` suffix
    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),

    /// The query matches none of the supported statements
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// No measurement name after FROM
    #[error("Missing measurement: {0}")]
    MissingMeasurement(String),

    #[error("Invalid bucket width: {0}")]
    InvalidBucketWidth(i64),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
