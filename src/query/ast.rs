//! Query descriptors
//!
//! The structured form of the InfluxQL-style query surface.
//!
//! # Example Queries
//!
//! ```text
//! SHOW DATABASES
//! CREATE DATABASE metrics
//! SELECT value FROM cpu
//! SELECT mean("value") FROM "cpu" WHERE time >= 1000ms and time <= 2000ms GROUP BY time(1m)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

pub const NANOS_PER_MILLI: i64 = 1_000_000;
pub const NANOS_PER_MINUTE: i64 = 60 * 1_000_000_000;

/// Bucket width used when an aggregation has no usable `group by time(Nm)`
pub const DEFAULT_BUCKET_WIDTH_NS: i64 = 5 * NANOS_PER_MINUTE;

/// Kind of a parsed query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    SelectPoints,
    ShowDatabases,
    ShowMeasurements,
    CreateDatabase,
    Use,
}

/// A parsed query ready for execution
#[derive(Debug, Clone, PartialEq)]
pub enum QueryDescriptor {
    SelectPoints(SelectStatement),
    ShowDatabases,
    ShowMeasurements,
    CreateDatabase { name: String },
    Use { database: String },
}

impl QueryDescriptor {
    pub fn command(&self) -> Command {
        match self {
            Self::SelectPoints(_) => Command::SelectPoints,
            Self::ShowDatabases => Command::ShowDatabases,
            Self::ShowMeasurements => Command::ShowMeasurements,
            Self::CreateDatabase { .. } => Command::CreateDatabase,
            Self::Use { .. } => Command::Use,
        }
    }

    /// The select statement, if this is a SELECT
    pub fn as_select(&self) -> Option<&SelectStatement> {
        match self {
            Self::SelectPoints(stmt) => Some(stmt),
            _ => None,
        }
    }
}

/// Which fields a SELECT reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelector {
    /// `*`
    All,
    /// A single named field
    Field(String),
}

impl FieldSelector {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Field(field) => field == name,
        }
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "*"),
            Self::Field(name) => write!(f, "{}", name),
        }
    }
}

/// Aggregation functions available in queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationFunc {
    /// Average of values
    Mean,
    /// Sum of values
    Sum,
    /// Count of values
    Count,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
}

impl AggregationFunc {
    /// Apply aggregation to a slice of values
    pub fn apply(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }

        Some(match self {
            Self::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Self::Sum => values.iter().sum(),
            Self::Count => values.len() as f64,
            Self::Min => values.iter().cloned().fold(f64::INFINITY, f64::min),
            Self::Max => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        })
    }

    /// Lowercase name, used as the result label
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
            Self::Count => "count",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

impl fmt::Display for AggregationFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `SELECT <selector> FROM <measurement> [WHERE ...] [GROUP BY ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub measurement: String,
    pub field: FieldSelector,
    pub aggregation: Option<AggregationFunc>,
    /// Inclusive lower bound, nanoseconds
    pub start_ns: i64,
    /// Inclusive upper bound, nanoseconds
    pub end_ns: i64,
    /// `None` returns raw points
    pub bucket_width_ns: Option<i64>,
}

impl SelectStatement {
    /// Raw select over all time up to `end_ns`
    pub fn new(measurement: impl Into<String>, field: FieldSelector, end_ns: i64) -> Self {
        Self {
            measurement: measurement.into(),
            field,
            aggregation: None,
            start_ns: 0,
            end_ns,
            bucket_width_ns: None,
        }
    }

    /// Builder method: aggregate with the default bucket width unless one is set
    pub fn aggregate(mut self, func: AggregationFunc) -> Self {
        self.aggregation = Some(func);
        self.bucket_width_ns.get_or_insert(DEFAULT_BUCKET_WIDTH_NS);
        self
    }

    /// Builder method: set the time range
    pub fn range(mut self, start_ns: i64, end_ns: i64) -> Self {
        self.start_ns = start_ns;
        self.end_ns = end_ns;
        self
    }

    /// Builder method: set the bucket width
    pub fn bucket_width(mut self, width_ns: i64) -> Self {
        self.bucket_width_ns = Some(width_ns);
        self
    }
}
