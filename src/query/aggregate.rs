//! Time-bucketed aggregation
//!
//! Turns ascending, range-filtered points into result rows. Buckets are
//! aligned to the epoch, not to the start of the query range:
//!
//! ```text
//! bucket = floor(timestamp / width) * width
//! ```

use crate::query::ast::{
    AggregationFunc, FieldSelector, QueryDescriptor, SelectStatement, DEFAULT_BUCKET_WIDTH_NS,
};
use crate::query::error::{QueryError, QueryResult};
use crate::storage::Point;
use serde::Serialize;
use std::collections::BTreeMap;

/// One output row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    /// Point timestamp, or bucket start when aggregated
    pub timestamp: i64,
    /// Field name for raw rows, aggregate name for aggregated rows
    pub label: String,
    pub value: f64,
}

impl ResultRow {
    pub fn new(timestamp: i64, label: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp,
            label: label.into(),
            value,
        }
    }
}

/// Aggregate points for a SELECT descriptor
pub fn aggregate(descriptor: &QueryDescriptor, points: &[Point]) -> QueryResult<Vec<ResultRow>> {
    match descriptor {
        QueryDescriptor::SelectPoints(stmt) => aggregate_select(stmt, points),
        other => Err(QueryError::InvalidQuery(format!(
            "{:?} does not produce rows",
            other.command()
        ))),
    }
}

/// Aggregate points for a select statement
pub fn aggregate_select(stmt: &SelectStatement, points: &[Point]) -> QueryResult<Vec<ResultRow>> {
    match stmt.aggregation {
        None => Ok(raw_rows(&stmt.field, points)),
        Some(func) => {
            let width = stmt.bucket_width_ns.unwrap_or(DEFAULT_BUCKET_WIDTH_NS);
            bucketed_rows(func, &stmt.field, width, points)
        }
    }
}

/// One row per (point, selected field), input order
fn raw_rows(selector: &FieldSelector, points: &[Point]) -> Vec<ResultRow> {
    let mut rows = Vec::new();

    for point in points {
        match selector {
            FieldSelector::All => {
                for (name, value) in &point.fields {
                    rows.push(ResultRow::new(point.timestamp, name.as_str(), *value));
                }
            }
            FieldSelector::Field(name) => {
                if let Some(value) = point.value(name) {
                    rows.push(ResultRow::new(point.timestamp, name.as_str(), value));
                }
            }
        }
    }

    rows
}

/// `None` when the bucket would start below `i64::MIN`
fn bucket_start(timestamp: i64, width: i64) -> Option<i64> {
    timestamp.div_euclid(width).checked_mul(width)
}

/// Reduce each bucket; rows ordered by bucket, then field name
fn bucketed_rows(
    func: AggregationFunc,
    selector: &FieldSelector,
    width: i64,
    points: &[Point],
) -> QueryResult<Vec<ResultRow>> {
    if width <= 0 {
        return Err(QueryError::InvalidBucketWidth(width));
    }

    let mut buckets: BTreeMap<i64, BTreeMap<&str, Vec<f64>>> = BTreeMap::new();
    for point in points {
        let Some(bucket) = bucket_start(point.timestamp, width) else {
            tracing::warn!(
                timestamp = point.timestamp,
                width_ns = width,
                "Bucket start out of range, point skipped"
            );
            continue;
        };

        for (name, value) in &point.fields {
            if selector.matches(name) {
                buckets
                    .entry(bucket)
                    .or_default()
                    .entry(name.as_str())
                    .or_default()
                    .push(*value);
            }
        }
    }

    tracing::debug!(
        buckets = buckets.len(),
        width_ns = width,
        func = %func,
        "Aggregated points into buckets"
    );

    let mut rows = Vec::new();
    for (bucket, fields) in buckets {
        for (name, values) in fields {
            let Some(value) = func.apply(&values) else {
                continue;
            };
            let label = match selector {
                FieldSelector::All => format!("{}_{}", func.name(), name),
                FieldSelector::Field(_) => func.name().to_string(),
            };
            rows.push(ResultRow::new(bucket, label, value));
        }
    }

    Ok(rows)
}
