//! Write path
//!
//! Splits a write body into lines, decodes each one and saves every field as
//! its own float row. What happens on a malformed line is caller policy:
//!
//! - [`BatchPolicy::Abort`]: stop at the first bad line. Lines before it are
//!   already stored.
//! - [`BatchPolicy::Skip`]: log and report the bad line, keep going.
//!
//! A line without a timestamp (or with timestamp 0) is stored at the current
//! wall-clock time.

use crate::protocol::{self, CodecError, Record};
use crate::storage::{now_nanos, StorageError, Store};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// What to do with a line that fails to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchPolicy {
    #[default]
    Abort,
    Skip,
}

/// Errors that abort an ingest
#[derive(Error, Debug)]
pub enum IngestError {
    /// A line failed to decode under [`BatchPolicy::Abort`]
    #[error("Line {line_number}: {source}")]
    Decode {
        line_number: usize,
        line: String,
        #[source]
        source: CodecError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for ingest operations
pub type IngestResult<T> = Result<T, IngestError>;

/// A line dropped under [`BatchPolicy::Skip`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedLine {
    /// 1-based line number in the body
    pub line_number: usize,
    pub line: String,
    pub error: String,
}

/// Outcome of one ingest call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    /// Non-empty lines seen
    pub lines: usize,
    /// Field rows saved
    pub points_written: usize,
    pub rejected: Vec<RejectedLine>,
}

/// Decodes write bodies into a [`Store`]
pub struct Ingestor {
    store: Arc<dyn Store>,
    policy: BatchPolicy,
}

impl Ingestor {
    pub fn new(store: Arc<dyn Store>, policy: BatchPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> BatchPolicy {
        self.policy
    }

    /// Ingest a newline-separated body of line protocol
    pub async fn ingest(&self, body: &str) -> IngestResult<IngestReport> {
        let mut report = IngestReport::default();

        for (idx, raw) in body.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            report.lines += 1;

            let record = match protocol::decode(line) {
                Ok(record) => record,
                Err(source) => match self.policy {
                    BatchPolicy::Abort => {
                        return Err(IngestError::Decode {
                            line_number: idx + 1,
                            line: line.to_string(),
                            source,
                        });
                    }
                    BatchPolicy::Skip => {
                        tracing::warn!(line_number = idx + 1, error = %source, "Skipping malformed line");
                        report.rejected.push(RejectedLine {
                            line_number: idx + 1,
                            line: line.to_string(),
                            error: source.to_string(),
                        });
                        continue;
                    }
                },
            };

            report.points_written += self.write_record(&record).await?;
        }

        tracing::debug!(
            lines = report.lines,
            points = report.points_written,
            rejected = report.rejected.len(),
            "Ingested batch"
        );

        Ok(report)
    }

    /// Save each field of a record; returns the number of rows written
    pub async fn write_record(&self, record: &Record) -> IngestResult<usize> {
        let timestamp = if record.has_timestamp() {
            record.timestamp
        } else {
            now_nanos()
        };

        let mut written = 0;
        for (name, value) in record.fields() {
            let Some(number) = value.to_f64() else {
                tracing::warn!(
                    measurement = %record.measurement,
                    field = %name,
                    literal = %value,
                    "Field has no numeric form, not stored"
                );
                continue;
            };

            self.store
                .save(&record.measurement, name, number, record.tags(), timestamp)
                .await?;
            written += 1;
        }

        Ok(written)
    }
}
