//! SQLite-backed point store
//!
//! One row per saved field:
//!
//! ```text
//! points(id, measurement, timestamp, tags JSON, field, value)
//! ```
//!
//! Range queries use the `(measurement, timestamp)` index. The connection is
//! guarded by a mutex and every statement runs on the blocking pool.

use crate::storage::{Point, StorageError, StorageResult, Store};
use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Durable store in a single SQLite database file
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Create or open a database file
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        tracing::info!(path = %path.display(), "Opened SQLite point store");
        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> StorageResult<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS points (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                measurement TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                tags TEXT NOT NULL,
                field TEXT NOT NULL,
                value REAL
            );
            CREATE INDEX IF NOT EXISTS idx_points_measurement_time
                ON points(measurement, timestamp);
            ",
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    /// Database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn with_conn<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StorageError::Lock(e.to_string()))?;
            f(&conn)
        })
        .await?
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn save(
        &self,
        measurement: &str,
        field: &str,
        value: f64,
        tags: &[(String, String)],
        timestamp: i64,
    ) -> StorageResult<()> {
        let measurement = measurement.to_string();
        let field = field.to_string();
        let tags = serde_json::to_string(tags)?;

        self.with_conn(move |conn| {
            conn.prepare_cached(
                "INSERT INTO points (measurement, timestamp, tags, field, value)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?
            .execute(params![measurement, timestamp, tags, field, value])?;
            Ok(())
        })
        .await
    }

    async fn range_query(
        &self,
        measurement: &str,
        start: i64,
        end: i64,
    ) -> StorageResult<Vec<Point>> {
        let measurement = measurement.to_string();

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT timestamp, tags, field, value FROM points
                 WHERE measurement = ?1 AND timestamp >= ?2 AND timestamp <= ?3
                 ORDER BY timestamp, id",
            )?;

            let rows = stmt
                .query_map(params![measurement, start, end], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<f64>>(3)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            let mut points = Vec::with_capacity(rows.len());
            for (timestamp, tags, field, value) in rows {
                // SQLite stores NaN as NULL
                let value = value.unwrap_or(f64::NAN);
                points.push(Point {
                    measurement: measurement.clone(),
                    tags: serde_json::from_str(&tags)?,
                    fields: BTreeMap::from([(field, value)]),
                    timestamp,
                });
            }
            Ok(points)
        })
        .await
    }

    async fn list_measurements(&self) -> StorageResult<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare_cached("SELECT DISTINCT measurement FROM points ORDER BY measurement")?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(names)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_and_range_query() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.save("cpu", "value", 3.0, &[], 300).await.unwrap();
        store.save("cpu", "value", 1.0, &[], 100).await.unwrap();
        store.save("cpu", "value", 2.0, &[], 200).await.unwrap();

        let points = store.range_query("cpu", 0, 1000).await.unwrap();
        let values: Vec<_> = points.iter().map(|p| p.value("value").unwrap()).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        assert!(store.path().is_none());
    }

    #[tokio::test]
    async fn test_range_bounds_inclusive() {
        let store = SqliteStore::open_in_memory().unwrap();
        for ts in [100, 200, 300] {
            store.save("cpu", "value", 1.0, &[], ts).await.unwrap();
        }

        assert_eq!(store.range_query("cpu", 100, 300).await.unwrap().len(), 3);
        assert_eq!(store.range_query("cpu", 101, 299).await.unwrap().len(), 1);
        assert!(store.range_query("mem", 0, 1000).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tags_preserved() {
        let store = SqliteStore::open_in_memory().unwrap();
        let tags = vec![
            ("host".to_string(), "server 1".to_string()),
            ("host".to_string(), "b".to_string()),
        ];
        store.save("cpu", "value", 4.2, &tags, 5).await.unwrap();

        let points = store.range_query("cpu", 5, 5).await.unwrap();
        assert_eq!(points[0].tags, tags);
        assert_eq!(points[0].tag_value("host"), Some("b"));
    }

    #[tokio::test]
    async fn test_list_measurements_distinct() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.save("mem", "v", 1.0, &[], 1).await.unwrap();
        store.save("cpu", "v", 1.0, &[], 1).await.unwrap();
        store.save("cpu", "w", 2.0, &[], 1).await.unwrap();

        assert_eq!(store.list_measurements().await.unwrap(), vec!["cpu", "mem"]);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("points.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.save("cpu", "value", 7.0, &[], 42).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let points = store.range_query("cpu", 0, 100).await.unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value("value"), Some(7.0));
        assert_eq!(store.path(), Some(path.as_path()));
    }
}
