//! # refluxdb
//!
//! Line-protocol time-series ingest with a small InfluxQL-style query surface.
//!
//! ## Features
//!
//! - **Codec**: Quote-aware line protocol decoder and encoder that keeps field
//!   literals exactly as written
//! - **Queries**: SHOW / CREATE / USE / SELECT with time ranges and
//!   epoch-aligned `GROUP BY time(Nm)` buckets
//! - **Aggregates**: mean, sum, count, min, max
//! - **Storage**: In-memory or SQLite point stores behind one async trait
//!
//! ## Modules
//!
//! - [`protocol`]: Line protocol codec
//! - [`query`]: Query interpreter, aggregator and executor
//! - [`storage`]: Point stores
//! - [`ingest`]: Write path with batch error policy
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use refluxdb::ingest::{BatchPolicy, Ingestor};
//! use refluxdb::query::QueryExecutor;
//! use refluxdb::storage::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!
//!     let ingestor = Ingestor::new(store.clone(), BatchPolicy::Abort);
//!     ingestor
//!         .ingest("cpu,host=a value=1 0\ncpu,host=a value=3 30000000000\n")
//!         .await?;
//!
//!     let executor = QueryExecutor::new(store, "mydb");
//!     let output = executor
//!         .execute_str("SELECT mean(value) FROM cpu WHERE time >= 0 GROUP BY time(1m)")
//!         .await?;
//!
//!     println!("{:?}", output.to_time_series());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod ingest;
pub mod protocol;
pub mod query;
pub mod storage;

// Re-export top-level types for convenience
pub use protocol::{decode, encode, CodecError, FieldValue, Record};

pub use query::{
    interpret, AggregationFunc, QueryDescriptor, QueryError, QueryExecutor,
    QueryOutput, ResultRow, SelectStatement,
};

pub use storage::{MemoryStore, Point, SqliteStore, StorageError, StorageResult, Store};

pub use ingest::{BatchPolicy, IngestError, IngestReport, Ingestor};

pub use config::{Config, ConfigError, LoggingConfig, StorageBackend, StorageConfig};
