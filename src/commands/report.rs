//! Report command implementation.
//!
//! The report command:
//! 1. Reads and decodes the trace file
//! 2. Builds per-thread call trees
//! 3. Summarizes the capture
//! 4. Prints the summary and optionally writes it as JSON

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use log::{debug, info};

use crate::capture::parse_capture_file;
use crate::output::{build_summary, render_text, write_summary};

/// Arguments for the report command
#[derive(Debug, Clone)]
pub struct ReportArgs {
    /// Path to the trace file to parse
    pub trace: PathBuf,

    /// Optional path for the JSON summary file
    pub output: Option<PathBuf>,

    /// Print the summary as JSON instead of text
    pub json: bool,
}

/// Check arguments before doing any work
pub fn validate_args(args: &ReportArgs) -> Result<()> {
    if args.trace.as_os_str().is_empty() {
        bail!("Trace path must not be empty");
    }
    if !args.trace.exists() {
        bail!("Trace file not found: {}", args.trace.display());
    }
    Ok(())
}

/// Execute the report command
///
/// # Errors
/// * Trace read or format errors
/// * Summary write errors
pub fn execute_report(args: ReportArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Parsing trace: {}", args.trace.display());

    let capture = parse_capture_file(&args.trace)
        .with_context(|| format!("Failed to parse trace {}", args.trace.display()))?;

    debug!(
        "Capture: {} samples, {} threads",
        capture.sample_count(),
        capture.threads().len()
    );

    let summary = build_summary(&capture);

    if let Some(path) = &args.output {
        write_summary(&summary, path)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render_text(&summary));
    }

    info!("Report completed in {:.2?}", start_time.elapsed());

    Ok(())
}

/// Execute the validate command: parse and report the outcome
pub fn execute_validate(trace: PathBuf) -> Result<()> {
    println!("Validating trace: {}", trace.display());

    let capture = parse_capture_file(&trace)
        .with_context(|| format!("Failed to parse trace {}", trace.display()))?;

    println!("✓ Valid simpleperf trace");
    println!("  Samples: {}", capture.sample_count());
    println!("  Lost samples: {}", capture.lost_sample_count());
    println!("  Threads: {}", capture.threads().len());
    println!("  Duration: {} us", capture.range().duration_us());

    Ok(())
}
