//! Capture summary report: schema, text rendering, and JSON file writer.
//!
//! The report is a derived artifact for humans and tooling; the capture
//! itself stays in memory. Schema is versioned to allow future evolution.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::capture::Capture;
use crate::tree::NodeRef;
use crate::utils::config::{NS_PER_US, SUMMARY_SCHEMA_VERSION};
use crate::utils::error::OutputError;

/// Top-level summary structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Schema version for compatibility checking
    pub version: String,

    /// Samples recorded by the agent (embedded counter)
    pub sample_count: u64,

    /// Samples the agent dropped (embedded counter)
    pub lost_sample_count: u64,

    /// Capture range in microseconds
    pub range: RangeSummary,

    /// Thread whose id equals the recording process's id, if identified
    pub main_thread_id: Option<i32>,

    /// Per-thread tree statistics, ordered by thread id
    pub threads: Vec<ThreadSummary>,

    /// Timestamp when the summary was generated
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSummary {
    pub min_us: i64,
    pub max_us: i64,
    pub duration_us: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub id: i32,
    pub name: String,

    /// Nodes in this thread's merged call tree, root included
    pub node_count: usize,

    /// Deepest stack observed for this thread
    pub max_depth: u32,

    /// Root span length in microseconds
    pub duration_us: i64,
}

/// Build a summary from a capture
pub fn build_summary(capture: &Capture) -> CaptureSummary {
    let range = capture.range();
    let threads = capture
        .threads()
        .iter()
        .filter_map(|info| {
            let root = capture.capture_node(info.id)?;
            Some(ThreadSummary {
                id: info.id,
                name: info.name.clone(),
                node_count: subtree_size(root),
                max_depth: max_depth(root),
                duration_us: root.duration() / NS_PER_US,
            })
        })
        .collect();

    CaptureSummary {
        version: SUMMARY_SCHEMA_VERSION.to_string(),
        sample_count: capture.sample_count(),
        lost_sample_count: capture.lost_sample_count(),
        range: RangeSummary {
            min_us: range.min_us,
            max_us: range.max_us,
            duration_us: range.duration_us(),
        },
        main_thread_id: capture.main_thread_id(),
        threads,
        generated_at: Utc::now().to_rfc3339(),
    }
}

fn subtree_size(node: NodeRef<'_>) -> usize {
    1 + node.children().map(subtree_size).sum::<usize>()
}

fn max_depth(node: NodeRef<'_>) -> u32 {
    node.children()
        .map(max_depth)
        .max()
        .unwrap_or_else(|| node.depth())
}

/// Render a summary as a human-readable text block
pub fn render_text(summary: &CaptureSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Samples: {} ({} lost)\n",
        summary.sample_count, summary.lost_sample_count
    ));
    out.push_str(&format!(
        "Range: {} us - {} us ({} us)\n",
        summary.range.min_us, summary.range.max_us, summary.range.duration_us
    ));
    match summary.main_thread_id {
        Some(id) => out.push_str(&format!("Main thread: {}\n", id)),
        None => out.push_str("Main thread: unknown\n"),
    }
    out.push_str(&format!("Threads: {}\n", summary.threads.len()));
    for thread in &summary.threads {
        out.push_str(&format!(
            "  [{}] {} - {} nodes, depth {}, {} us\n",
            thread.id, thread.name, thread.node_count, thread.max_depth, thread.duration_us
        ));
    }
    out
}

/// Write a summary to a JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - path empty, a directory, or not creatable
pub fn write_summary(
    summary: &CaptureSummary,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing summary to: {}", output_path.display());

    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, summary).map_err(OutputError::SerializationFailed)?;

    Ok(())
}

fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }
    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }
    Ok(())
}
