//! Line Protocol Codec
//!
//! Decodes and encodes the textual line protocol used for writes:
//!
//! - **value**: Field literal typing (`FieldValue`)
//! - **record**: Decoded line (`Record`)
//! - **parser**: Quote-aware line decoder
//! - **serializer**: Line encoder
//! - **error**: Error types
//!
//! # Format
//!
//! ```text
//! weather,location=us-midwest temperature=82,raining=true 1465839830100400200
//! └──┬──┘ └────────┬────────┘ └───────────┬───────────┘ └────────┬────────┘
//! measurement     tags                  fields                timestamp
//! ```
//!
//! # Example
//!
//! ```rust
//! use refluxdb::protocol::{decode, encode};
//!
//! let record = decode("cpu,host=server1 value=42i 1465839830100400200").unwrap();
//! assert_eq!(record.tag("host"), Some("server1"));
//! assert_eq!(record.field("value").unwrap().literal(), "42i");
//! assert_eq!(encode(&record), "cpu,host=server1 value=42i 1465839830100400200");
//! ```

mod error;
mod parser;
mod record;
mod serializer;
mod value;

pub use error::{CodecError, CodecResult};
pub use record::Record;
pub use value::FieldValue;

/// Decode one line of line protocol
pub fn decode(line: &str) -> CodecResult<Record> {
    parser::parse_line(line)
}

/// Encode a record as one line of line protocol
pub fn encode(record: &Record) -> String {
    serializer::write_line(record)
}
