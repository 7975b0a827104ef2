//! refluxdb Point Stores
//!
//! The write and query paths talk to storage only through the [`Store`] trait:
//!
//! - **types**: `Point` and the nanosecond clock
//! - **memory**: `MemoryStore`, sorted vectors behind a `tokio` lock
//! - **sqlite**: `SqliteStore`, one durable SQLite file
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   Record → one save() per field → Store
//!
//! Read Path:
//!   SelectStatement → range_query() → ascending Points → Aggregator
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use refluxdb::storage::{MemoryStore, Store};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::new();
//!     store.save("cpu", "value", 42.0, &[], 1_000).await?;
//!
//!     let points = store.range_query("cpu", 0, 2_000).await?;
//!     assert_eq!(points.len(), 1);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod types;

use crate::config::{StorageBackend, StorageConfig};
use async_trait::async_trait;
use std::sync::Arc;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use types::{now_nanos, Point};

/// Point storage collaborator
#[async_trait]
pub trait Store: Send + Sync {
    /// Save one field value of a point
    async fn save(
        &self,
        measurement: &str,
        field: &str,
        value: f64,
        tags: &[(String, String)],
        timestamp: i64,
    ) -> StorageResult<()>;

    /// Points of a measurement with `start <= timestamp <= end`, ascending
    async fn range_query(
        &self,
        measurement: &str,
        start: i64,
        end: i64,
    ) -> StorageResult<Vec<Point>>;

    /// Distinct measurement names, sorted
    async fn list_measurements(&self) -> StorageResult<Vec<String>>;
}

/// Open the store selected by configuration
pub fn open_store(config: &StorageConfig) -> StorageResult<Arc<dyn Store>> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory point store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Sqlite => Ok(Arc::new(SqliteStore::open(&config.path)?)),
    }
}
