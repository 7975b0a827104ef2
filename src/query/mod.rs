//! refluxdb Query Engine
//!
//! Provides the InfluxQL-style query surface over stored points:
//!
//! - **AST**: Query descriptor types
//! - **Parser**: Interpret query strings into descriptors
//! - **Aggregate**: Epoch-aligned time bucketing and reduction
//! - **Executor**: Execute descriptors against a `Store`
//!
//! # Query Language
//!
//! ```text
//! SHOW DATABASES | SHOW MEASUREMENTS
//! CREATE DATABASE <name> | USE <name>
//! SELECT * | field | mean|sum|count|min|max(field) FROM measurement
//! [WHERE time >= T1[ms] and time <= T2[ms]]
//! [GROUP BY time(Nm)]
//! ```
//!
//! # Examples
//!
//! ## Interpreting
//!
//! ```rust
//! use refluxdb::query::{interpret_at, AggregationFunc, QueryDescriptor};
//!
//! let descriptor = interpret_at(
//!     "SELECT mean(value) FROM cpu WHERE time >= 1000ms GROUP BY time(1m)",
//!     5_000_000_000,
//! )
//! .unwrap();
//!
//! let stmt = descriptor.as_select().unwrap();
//! assert_eq!(stmt.aggregation, Some(AggregationFunc::Mean));
//! assert_eq!(stmt.start_ns, 1_000_000_000);
//! assert_eq!(stmt.end_ns, 5_000_000_000);
//! ```
//!
//! ## Executing
//!
//! ```rust,ignore
//! let executor = QueryExecutor::new(store, "mydb");
//! let output = executor
//!     .execute_str("SELECT max(value) FROM cpu GROUP BY time(5m)")
//!     .await?;
//! ```

mod aggregate;
mod ast;
mod error;
mod executor;
mod parser;

pub use aggregate::{aggregate, aggregate_select, ResultRow};
pub use ast::{
    AggregationFunc, Command, FieldSelector, QueryDescriptor, SelectStatement,
    DEFAULT_BUCKET_WIDTH_NS, NANOS_PER_MILLI, NANOS_PER_MINUTE,
};
pub use error::{QueryError, QueryResult};
pub use executor::{QueryExecutor, QueryOutput};
pub use parser::{interpret, interpret_at};
