//! Line protocol error types
//!
//! Every variant carries the offending text so callers can report it verbatim.

use thiserror::Error;

/// Errors that can occur while decoding a line of line protocol
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The measurement name is empty
    #[error("Empty measurement: {0}")]
    EmptyMeasurement(String),

    /// A quoted measurement or value never closes
    #[error("Unterminated quote: {0}")]
    UnterminatedQuote(String),

    /// A tag pair is missing its `=` or has trailing garbage
    #[error("Invalid tag format: {0}")]
    InvalidTagFormat(String),

    #[error("Empty tag key: {0}")]
    EmptyTagKey(String),

    #[error("Empty tag value: {0}")]
    EmptyTagValue(String),

    /// A field pair is missing its `=`
    #[error("Invalid field format: {0}")]
    InvalidFieldFormat(String),

    #[error("Empty field key: {0}")]
    EmptyFieldKey(String),

    #[error("Invalid string field value: {0}")]
    InvalidStringField(String),

    #[error("Invalid integer field value: {0}")]
    InvalidIntegerField(String),

    #[error("Invalid numeric field value: {0}")]
    InvalidNumericField(String),

    /// Nothing follows the space after the measurement and tags
    #[error("Missing fields: {0}")]
    MissingFields(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The line has no fields segment at all
    #[error("Invalid line protocol format: {0}")]
    InvalidFormat(String),
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;
