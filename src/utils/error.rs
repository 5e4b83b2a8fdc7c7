//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Structural errors in the trace byte stream.
///
/// Every variant is fatal: the parse aborts and no capture is produced.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("magic number mismatch: trace does not begin with \"SIMPLEPERF\"")]
    MagicNumberMismatch,

    #[error("unsupported trace version: {0}")]
    UnsupportedVersion(u16),

    #[error("truncated trace header: version field missing")]
    ShortHeader,

    #[error("truncated record length prefix at offset {offset}")]
    TruncatedLength { offset: usize },

    #[error("truncated record at offset {offset}: {declared} bytes declared, {remaining} available")]
    TruncatedRecord {
        offset: usize,
        declared: usize,
        remaining: usize,
    },

    #[error("malformed record at offset {offset}: {source}")]
    MalformedRecord {
        offset: usize,
        #[source]
        source: prost::DecodeError,
    },
}

/// Errors that can occur while turning a trace file into a capture
#[derive(Error, Debug)]
pub enum TraceError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("failed to read trace file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while writing the summary report
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("invalid output path: {0}")]
    InvalidPath(String),
}
