//! Simpleperf Trace Studio CLI
//!
//! Parses simpleperf traces into per-thread call trees and prints a
//! capture summary.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use simpleperf_trace_studio::commands::{
    execute_report, execute_validate, validate_args, ReportArgs,
};
use simpleperf_trace_studio::utils::config::SUMMARY_SCHEMA_VERSION;

/// Simpleperf Trace Studio - call-tree construction for CPU profiles
#[derive(Parser, Debug)]
#[command(name = "simpleperf-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a trace and print a capture summary
    Report {
        /// Path to the trace file
        #[arg(short, long)]
        trace: PathBuf,

        /// Optional output path for the JSON summary
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the summary as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check that a trace file decodes cleanly
    Validate {
        /// Path to the trace file
        #[arg(short, long)]
        trace: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Report {
            trace,
            output,
            json,
        } => {
            let args = ReportArgs {
                trace,
                output,
                json,
            };
            validate_args(&args)?;
            execute_report(args)?;
        }

        Commands::Validate { trace } => {
            execute_validate(trace)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Display version information
fn display_version() {
    println!("Simpleperf Trace Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Summary Schema: v{}", SUMMARY_SCHEMA_VERSION);
    println!();
    println!("Parses simpleperf traces into per-thread call trees.");
}
