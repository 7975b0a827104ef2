//! In-memory point store
//!
//! Points are kept per measurement in timestamp order, so a range query is two
//! binary searches and a copy.

use crate::storage::{Point, StorageResult, Store};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// Volatile store backed by sorted vectors
#[derive(Debug, Default)]
pub struct MemoryStore {
    series: RwLock<HashMap<String, Vec<Point>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored rows
    pub async fn len(&self) -> usize {
        self.series.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn save(
        &self,
        measurement: &str,
        field: &str,
        value: f64,
        tags: &[(String, String)],
        timestamp: i64,
    ) -> StorageResult<()> {
        let point = Point {
            measurement: measurement.to_string(),
            tags: tags.to_vec(),
            fields: BTreeMap::from([(field.to_string(), value)]),
            timestamp,
        };

        let mut series = self.series.write().await;
        let points = series.entry(measurement.to_string()).or_default();
        // Insert after equal timestamps to keep arrival order
        let idx = points.partition_point(|p| p.timestamp <= timestamp);
        points.insert(idx, point);
        Ok(())
    }

    async fn range_query(
        &self,
        measurement: &str,
        start: i64,
        end: i64,
    ) -> StorageResult<Vec<Point>> {
        let series = self.series.read().await;
        let Some(points) = series.get(measurement) else {
            return Ok(Vec::new());
        };

        let from = points.partition_point(|p| p.timestamp < start);
        let to = points.partition_point(|p| p.timestamp <= end);
        if from >= to {
            return Ok(Vec::new());
        }
        Ok(points[from..to].to_vec())
    }

    async fn list_measurements(&self) -> StorageResult<Vec<String>> {
        let series = self.series.read().await;
        let mut names: Vec<_> = series.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
