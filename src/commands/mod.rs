//! CLI command implementations.

mod report;

pub use report::{execute_report, execute_validate, validate_args, ReportArgs};
