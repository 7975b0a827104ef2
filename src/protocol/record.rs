//! Decoded line protocol record

use crate::protocol::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One decoded line: measurement, tags, fields and an optional timestamp.
///
/// Tags are kept exactly as written, duplicates included; lookup by key
/// returns the last occurrence. Field keys are unique and re-inserting a key
/// replaces its value in place. A timestamp of 0 means "not set".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Measurement (series) name
    pub measurement: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, FieldValue)>,
    /// Unix timestamp in nanoseconds, 0 when absent
    #[serde(default)]
    pub timestamp: i64,
}

impl Record {
    /// Create an empty record for a measurement
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: Vec::new(),
            fields: Vec::new(),
            timestamp: 0,
        }
    }

    /// Build a record from maps that carry no ordering.
    ///
    /// Tag and field keys are sorted so encoding is deterministic.
    pub fn from_unordered(
        measurement: impl Into<String>,
        tags: HashMap<String, String>,
        fields: HashMap<String, FieldValue>,
        timestamp: i64,
    ) -> Self {
        let mut tags: Vec<_> = tags.into_iter().collect();
        tags.sort_by(|a, b| a.0.cmp(&b.0));

        let mut fields: Vec<_> = fields.into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        Self {
            measurement: measurement.into(),
            tags,
            fields,
            timestamp,
        }
    }

    /// Builder method: append a tag
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_tag(key, value);
        self
    }

    /// Builder method: set a field
    pub fn with_field(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.insert_field(key, value);
        self
    }

    /// Builder method: set the timestamp
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Append a tag as written
    pub fn push_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.push((key.into(), value.into()));
    }

    /// Insert a field, replacing the value of an existing key in place
    pub fn insert_field(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Tags in written order
    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    /// Fields in written order
    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    /// Value of a tag; the last occurrence wins
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of a field
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether a timestamp was given (0 is indistinguishable from absent)
    pub fn has_timestamp(&self) -> bool {
        self.timestamp != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_tags_kept_as_written() {
        let record = Record::new("cpu").with_tag("host", "a").with_tag("host", "b");
        assert_eq!(record.tags().len(), 2);
        assert_eq!(record.tag("host"), Some("b"));
    }

    #[test]
    fn test_field_reinsert_replaces_in_place() {
        let record = Record::new("cpu")
            .with_field("a", FieldValue::Float("1".to_string()))
            .with_field("b", FieldValue::Float("2".to_string()))
            .with_field("a", FieldValue::Integer("3i".to_string()));

        let keys: Vec<_> = record.fields().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(record.field("a").map(|v| v.literal()), Some("3i"));
    }

    #[test]
    fn test_from_unordered_sorts_keys() {
        let tags = HashMap::from([
            ("region".to_string(), "us".to_string()),
            ("host".to_string(), "a".to_string()),
        ]);
        let fields = HashMap::from([
            ("temp".to_string(), FieldValue::Float("1".to_string())),
            ("load".to_string(), FieldValue::Float("2".to_string())),
        ]);

        let record = Record::from_unordered("cpu", tags, fields, 0);
        assert_eq!(record.tags()[0].0, "host");
        assert_eq!(record.fields()[0].0, "load");
        assert!(!record.has_timestamp());
    }
}
