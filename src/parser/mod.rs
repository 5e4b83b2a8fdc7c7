//! Trace decoding: record schema and the framed binary reader.

pub mod proto;
pub mod reader;

pub use reader::{decode_records, read_trace, RecordStream};
