//! Derived report output for a parsed capture.

pub mod summary;

pub use summary::{build_summary, render_text, write_summary, CaptureSummary};
