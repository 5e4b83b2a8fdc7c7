//! The immutable capture produced by a successful parse.
//!
//! Assembled only after decode and tree construction both finish; a fatal
//! error anywhere upstream means no `Capture` exists at all. Once built,
//! nothing is written again, so the value can be shared across threads
//! freely.

use std::collections::BTreeMap;
use std::path::Path;

use log::debug;

use crate::parser::reader::{decode_records, read_trace, RecordStream};
use crate::parser::proto::Sample;
use crate::resolver::FrameResolver;
use crate::tree::builder::build_thread_trees;
use crate::tree::{CaptureTree, NodeRef};
use crate::utils::config::NS_PER_US;
use crate::utils::error::{FormatError, TraceError};

/// Capture time range in microseconds (the reporting unit; samples are
/// recorded in nanoseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub min_us: i64,
    pub max_us: i64,
}

impl TimeRange {
    pub fn duration_us(&self) -> i64 {
        self.max_us - self.min_us
    }
}

/// One observed thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo {
    pub id: i32,
    pub name: String,
}

/// Result of parsing one trace: per-thread call trees plus capture-wide
/// metadata.
#[derive(Debug)]
pub struct Capture {
    range: TimeRange,
    threads: Vec<ThreadInfo>,
    trees: BTreeMap<i32, CaptureTree>,
    main_thread_id: Option<i32>,
    sample_count: u64,
    lost_sample_count: u64,
}

impl Capture {
    /// Root of one thread's call tree, or None for an unsampled thread id.
    pub fn capture_node(&self, thread_id: i32) -> Option<NodeRef<'_>> {
        self.trees.get(&thread_id).map(CaptureTree::root)
    }

    /// All per-thread roots, ordered by thread id.
    pub fn capture_nodes(&self) -> Vec<NodeRef<'_>> {
        self.trees.values().map(CaptureTree::root).collect()
    }

    /// Observed threads, ordered by id. Names match the tree roots.
    pub fn threads(&self) -> &[ThreadInfo] {
        &self.threads
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    /// The thread whose id equals the recording process's id, when the
    /// trace metadata identifies one.
    pub fn main_thread_id(&self) -> Option<i32> {
        self.main_thread_id
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    pub fn lost_sample_count(&self) -> u64 {
        self.lost_sample_count
    }
}

/// Parse a trace file into a capture
///
/// # Errors
/// * `TraceError::Io` - file missing or unreadable
/// * `TraceError::Format` - structural violation in the byte stream
pub fn parse_capture_file(path: impl AsRef<Path>) -> Result<Capture, TraceError> {
    let stream = read_trace(path)?;
    Ok(assemble(stream))
}

/// Parse an in-memory trace buffer into a capture
pub fn parse_capture(bytes: &[u8]) -> Result<Capture, FormatError> {
    let stream = decode_records(bytes)?;
    Ok(assemble(stream))
}

/// Build the capture from a fully decoded record stream. Infallible: every
/// structural check already happened during decoding.
fn assemble(stream: RecordStream) -> Capture {
    let resolver = FrameResolver::new(&stream.files);
    let trees = build_thread_trees(&stream.samples, &resolver, &stream.threads);

    let threads = trees
        .iter()
        .map(|(&id, tree)| ThreadInfo {
            id,
            name: tree.root().data().name().to_string(),
        })
        .collect();

    let capture = Capture {
        range: sample_range(&stream.samples),
        threads,
        main_thread_id: find_main_thread(&stream),
        trees,
        sample_count: stream.sample_count,
        lost_sample_count: stream.lost_sample_count,
    };

    debug!(
        "Capture assembled: {} threads, range {}..{} us",
        capture.threads.len(),
        capture.range.min_us,
        capture.range.max_us
    );

    capture
}

/// Global min/max sample timestamp, converted ns -> us. Computed once from
/// the full sample set.
fn sample_range(samples: &[Sample]) -> TimeRange {
    let mut times = samples.iter().map(|sample| sample.time as i64);
    let Some(first) = times.next() else {
        return TimeRange {
            min_us: 0,
            max_us: 0,
        };
    };
    let (min_ns, max_ns) = times.fold((first, first), |(min, max), time| {
        (min.min(time), max.max(time))
    });
    TimeRange {
        min_us: min_ns / NS_PER_US,
        max_us: max_ns / NS_PER_US,
    }
}

/// The main thread is the one whose id equals its process id. Thread
/// metadata wins; sample fields are the fallback when the registry is
/// incomplete.
fn find_main_thread(stream: &RecordStream) -> Option<i32> {
    stream
        .threads
        .values()
        .find(|thread| thread.thread_id == thread.process_id)
        .map(|thread| thread.thread_id)
        .or_else(|| {
            stream
                .samples
                .iter()
                .find(|sample| sample.thread_id == sample.process_id)
                .map(|sample| sample.thread_id)
        })
}
