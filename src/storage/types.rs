//! Core data types for the point stores
//!
//! - `Point`: one stored measurement with its float fields
//! - `now_nanos`: wall-clock time in the stores' unit

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A stored time-series point
///
/// Fields are float-valued and iterate in sorted name order. Stores save one
/// field per row, so a point read back usually carries a single field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Point {
    /// Measurement (series) name
    pub measurement: String,
    /// Tags as written, order preserved
    #[serde(default)]
    pub tags: Vec<(String, String)>,
    /// Field name → value
    pub fields: BTreeMap<String, f64>,
    /// Unix timestamp in nanoseconds
    pub timestamp: i64,
}

impl Point {
    /// Create a point with no tags or fields
    pub fn new(measurement: impl Into<String>, timestamp: i64) -> Self {
        Self {
            measurement: measurement.into(),
            tags: Vec::new(),
            fields: BTreeMap::new(),
            timestamp,
        }
    }

    /// Builder method: add a tag
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    /// Builder method: set a field
    pub fn field(mut self, name: impl Into<String>, value: f64) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Value of one field
    pub fn value(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }

    /// Value of a tag; the last occurrence wins
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Current wall-clock time as Unix nanoseconds.
///
/// Saturates at `i64::MAX` past the year 2262.
pub fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}
