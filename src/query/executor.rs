//! Query Executor
//!
//! Runs interpreted queries against a [`Store`]:
//! 1. Interpret the query string
//! 2. Fetch the measurement's points in the time range
//! 3. Aggregate into result rows
//!
//! # Execution Pipeline
//!
//! ```text
//! query string → QueryDescriptor → range_query → aggregate → QueryOutput
//! ```
//!
//! Database commands are session bookkeeping only: points are not partitioned
//! by database.

use crate::query::aggregate::{aggregate_select, ResultRow};
use crate::query::ast::*;
use crate::query::error::QueryResult;
use crate::storage::Store;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Result of a query execution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryOutput {
    /// SHOW DATABASES
    Databases { names: Vec<String> },
    /// SHOW MEASUREMENTS
    Measurements { names: Vec<String> },
    /// CREATE DATABASE / USE
    Acknowledged { database: String },
    /// SELECT
    Rows {
        measurement: String,
        /// `time` followed by each distinct label in row order
        columns: Vec<String>,
        rows: Vec<ResultRow>,
    },
}

impl QueryOutput {
    /// Number of result rows or names
    pub fn len(&self) -> usize {
        match self {
            Self::Databases { names } | Self::Measurements { names } => names.len(),
            Self::Acknowledged { .. } => 0,
            Self::Rows { rows, .. } => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(timestamp, value)` pairs of a SELECT result
    pub fn to_time_series(&self) -> Vec<(i64, f64)> {
        match self {
            Self::Rows { rows, .. } => rows.iter().map(|r| (r.timestamp, r.value)).collect(),
            _ => Vec::new(),
        }
    }
}

/// Query executor
pub struct QueryExecutor {
    store: Arc<dyn Store>,
    databases: RwLock<BTreeSet<String>>,
    current: RwLock<String>,
}

impl QueryExecutor {
    /// Create an executor whose session starts in `default_database`
    pub fn new(store: Arc<dyn Store>, default_database: impl Into<String>) -> Self {
        let default_database = default_database.into();
        Self {
            store,
            databases: RwLock::new(BTreeSet::from([default_database.clone()])),
            current: RwLock::new(default_database),
        }
    }

    /// Database selected by the last USE
    pub async fn current_database(&self) -> String {
        self.current.read().await.clone()
    }

    /// Execute a query string (interprets and executes)
    pub async fn execute_str(&self, query_str: &str) -> QueryResult<QueryOutput> {
        let descriptor = crate::query::parser::interpret(query_str)?;
        self.execute(descriptor).await
    }

    /// Execute an interpreted query
    pub async fn execute(&self, descriptor: QueryDescriptor) -> QueryResult<QueryOutput> {
        match descriptor {
            QueryDescriptor::ShowDatabases => {
                let names = self.databases.read().await.iter().cloned().collect();
                Ok(QueryOutput::Databases { names })
            }
            QueryDescriptor::ShowMeasurements => {
                let names = self.store.list_measurements().await?;
                Ok(QueryOutput::Measurements { names })
            }
            QueryDescriptor::CreateDatabase { name } => {
                tracing::info!(database = %name, "Creating database");
                self.databases.write().await.insert(name.clone());
                Ok(QueryOutput::Acknowledged { database: name })
            }
            QueryDescriptor::Use { database } => {
                tracing::info!(database = %database, "Switching database");
                *self.current.write().await = database.clone();
                Ok(QueryOutput::Acknowledged { database })
            }
            QueryDescriptor::SelectPoints(stmt) => self.select(stmt).await,
        }
    }

    async fn select(&self, stmt: SelectStatement) -> QueryResult<QueryOutput> {
        let start = Instant::now();

        let points = self
            .store
            .range_query(&stmt.measurement, stmt.start_ns, stmt.end_ns)
            .await?;
        let rows = aggregate_select(&stmt, &points)?;

        let mut columns = vec!["time".to_string()];
        for row in &rows {
            if !columns.contains(&row.label) {
                columns.push(row.label.clone());
            }
        }

        tracing::debug!(
            measurement = %stmt.measurement,
            field = %stmt.field,
            points = points.len(),
            rows = rows.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Executed select"
        );

        Ok(QueryOutput::Rows {
            measurement: stmt.measurement,
            columns,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::error::QueryError;
    use crate::storage::MemoryStore;

    const SEC: i64 = 1_000_000_000;

    async fn executor_with_data() -> QueryExecutor {
        let store = Arc::new(MemoryStore::new());
        store.save("cpu", "value", 1.0, &[], 0).await.unwrap();
        store.save("cpu", "value", 3.0, &[], 30 * SEC).await.unwrap();
        store.save("cpu", "value", 10.0, &[], 70 * SEC).await.unwrap();
        store.save("mem", "used", 5.0, &[], 10 * SEC).await.unwrap();
        QueryExecutor::new(store, "mydb")
    }

    #[tokio::test]
    async fn test_show_databases_tracks_creates() {
        let executor = executor_with_data().await;

        let output = executor.execute_str("SHOW DATABASES").await.unwrap();
        assert_eq!(
            output,
            QueryOutput::Databases {
                names: vec!["mydb".to_string()]
            }
        );

        executor.execute_str("CREATE DATABASE metrics").await.unwrap();
        let output = executor.execute_str("show databases").await.unwrap();
        assert_eq!(
            output,
            QueryOutput::Databases {
                names: vec!["metrics".to_string(), "mydb".to_string()]
            }
        );
    }

    #[tokio::test]
    async fn test_show_measurements() {
        let executor = executor_with_data().await;
        let output = executor.execute_str("SHOW MEASUREMENTS").await.unwrap();
        assert_eq!(
            output,
            QueryOutput::Measurements {
                names: vec!["cpu".to_string(), "mem".to_string()]
            }
        );
    }

    #[tokio::test]
    async fn test_use_switches_session() {
        let executor = executor_with_data().await;
        assert_eq!(executor.current_database().await, "mydb");

        let output = executor.execute_str("USE other").await.unwrap();
        assert_eq!(
            output,
            QueryOutput::Acknowledged {
                database: "other".to_string()
            }
        );
        assert_eq!(executor.current_database().await, "other");
    }

    #[tokio::test]
    async fn test_select_mean_grouped() {
        let executor = executor_with_data().await;
        let output = executor
            .execute_str(
                "SELECT mean(\"value\") FROM \"cpu\" WHERE time >= 0ms and time <= 100000ms GROUP BY time(1m)",
            )
            .await
            .unwrap();

        assert_eq!(output.to_time_series(), vec![(0, 2.0), (60 * SEC, 10.0)]);
        match output {
            QueryOutput::Rows {
                measurement,
                columns,
                ..
            } => {
                assert_eq!(measurement, "cpu");
                assert_eq!(columns, vec!["time", "mean"]);
            }
            other => panic!("expected rows, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_select_raw_range() {
        let executor = executor_with_data().await;
        let output = executor
            .execute_str("SELECT value FROM cpu WHERE time >= 30000ms and time <= 70000ms")
            .await
            .unwrap();

        assert_eq!(output.to_time_series(), vec![(30 * SEC, 3.0), (70 * SEC, 10.0)]);
        assert_eq!(output.len(), 2);
    }

    #[tokio::test]
    async fn test_select_unknown_measurement_is_empty() {
        let executor = executor_with_data().await;
        let output = executor.execute_str("SELECT * FROM disk").await.unwrap();
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_query_surfaces() {
        let executor = executor_with_data().await;
        assert!(matches!(
            executor.execute_str("DELETE FROM cpu").await,
            Err(QueryError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_output_serializes_with_kind() {
        let output = QueryOutput::Acknowledged {
            database: "mydb".to_string(),
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["kind"], "acknowledged");
        assert_eq!(json["database"], "mydb");
    }
}
