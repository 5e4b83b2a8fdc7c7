//! End-to-end tests over synthesized trace files.
//!
//! Fixtures are built in memory: prost-encoded records framed with the
//! same header and length prefixes the recording agent writes.

use byteorder::{LittleEndian, WriteBytesExt};
use pretty_assertions::assert_eq;
use prost::Message;

use simpleperf_trace_studio::capture::{parse_capture, parse_capture_file, Capture};
use simpleperf_trace_studio::parser::proto::{self, record::RecordData};
use simpleperf_trace_studio::resolver::NodeModel;
use simpleperf_trace_studio::tree::NodeRef;
use simpleperf_trace_studio::utils::error::{FormatError, TraceError};

const MAIN_TID: i32 = 8589;
const RENDER_TID: i32 = 8600;

fn frame(records: &[proto::Record]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"SIMPLEPERF");
    out.write_u16::<LittleEndian>(1).unwrap();
    for record in records {
        let body = record.encode_to_vec();
        out.write_u32::<LittleEndian>(body.len() as u32).unwrap();
        out.extend_from_slice(&body);
    }
    out
}

fn file_record(id: u32, path: &str, symbols: &[&str]) -> proto::Record {
    proto::Record {
        record_data: Some(RecordData::File(proto::File {
            id,
            path: path.to_string(),
            symbol: symbols.iter().map(|s| s.to_string()).collect(),
        })),
    }
}

fn thread_record(thread_id: i32, process_id: i32, name: &str) -> proto::Record {
    proto::Record {
        record_data: Some(RecordData::Thread(proto::Thread {
            thread_id,
            process_id,
            thread_name: name.to_string(),
        })),
    }
}

fn lost_record(sample_count: u64, lost_count: u64) -> proto::Record {
    proto::Record {
        record_data: Some(RecordData::Lost(proto::LostSituation {
            sample_count,
            lost_count,
        })),
    }
}

/// Chain entries are (vaddr, file_id, symbol_id), innermost frame first.
fn sample_record(thread_id: i32, time: u64, chain: &[(u64, u32, i32)]) -> proto::Record {
    proto::Record {
        record_data: Some(RecordData::Sample(proto::Sample {
            time,
            thread_id,
            process_id: MAIN_TID,
            callchain: chain
                .iter()
                .map(|&(vaddr_in_file, file_id, symbol_id)| proto::CallChainEntry {
                    vaddr_in_file,
                    file_id,
                    symbol_id,
                })
                .collect(),
        })),
    }
}

// File table shared by the fixtures.
//   0: bionic libc      (__start_thread, __pthread_start, __ioctl)
//   1: app native lib   (render_frame, compute, mix)
//   2: boot.oat         (MainActivity.onCreate)
fn file_table() -> Vec<proto::Record> {
    vec![
        file_record(
            0,
            "/apex/com.android.runtime/lib64/bionic/libc.so",
            &["__start_thread", "__pthread_start", "__ioctl"],
        ),
        file_record(
            1,
            "/data/app/e.sample.tunnel/lib/arm64/libwork.so",
            &["render_frame(int)", "compute()", "mix()"],
        ),
        file_record(
            2,
            "/system/framework/arm64/boot.oat",
            &["void e.sample.tunnel.MainActivity.onCreate(android.os.Bundle)"],
        ),
    ]
}

const PROLOGUE: &[(u64, u32, i32)] = &[(0x2000, 0, 1), (0x1000, 0, 0)];

fn with_prologue(work: &[(u64, u32, i32)]) -> Vec<(u64, u32, i32)> {
    let mut chain = work.to_vec();
    chain.extend_from_slice(PROLOGUE);
    chain
}

/// A capture with two threads, merged and divergent chains, and embedded
/// counters.
fn reference_trace() -> Vec<u8> {
    let work = [(0x30, 1, 2), (0x20, 1, 1), (0x10, 1, 0)];
    let work_with_syscall = [(0x40, 0, 2), (0x30, 1, 2), (0x20, 1, 1), (0x10, 1, 0)];
    let java_work = [(0x500, 2, 0)];

    let mut records = file_table();
    records.push(thread_record(MAIN_TID, MAIN_TID, "e.sample.tunnel"));
    records.push(thread_record(RENDER_TID, MAIN_TID, "RenderThread"));
    records.extend([
        sample_record(MAIN_TID, 10_000_000, &with_prologue(&work)),
        sample_record(MAIN_TID, 10_010_000, &with_prologue(&work)),
        sample_record(RENDER_TID, 10_015_000, &with_prologue(&java_work)),
        sample_record(MAIN_TID, 10_020_000, &with_prologue(&work_with_syscall)),
        sample_record(MAIN_TID, 10_030_000, &[]),
    ]);
    records.push(lost_record(4, 93));
    frame(&records)
}

fn parse_reference() -> Capture {
    parse_capture(&reference_trace()).unwrap()
}

#[test]
fn samples_and_lost_count_match_embedded_counters() {
    let capture = parse_reference();

    assert_eq!(capture.sample_count(), 4);
    assert_eq!(capture.lost_sample_count(), 93);
}

#[test]
fn all_trees_start_with_thread_name() {
    let capture = parse_reference();

    assert!(!capture.capture_nodes().is_empty());
    for thread in capture.threads() {
        let tree = capture.capture_node(thread.id).unwrap();
        assert_eq!(tree.data().name(), thread.name);
    }
}

#[test]
fn node_depths_are_coherent() {
    let capture = parse_reference();

    for root in capture.capture_nodes() {
        assert_eq!(root.depth(), 0);
        assert_depths(root);
    }
}

fn assert_depths(node: NodeRef<'_>) {
    for i in 0..node.child_count() {
        let child = node.child_at(i).unwrap();
        assert_eq!(child.depth(), node.depth() + 1);
        assert!(child.start() >= node.start());
        assert!(child.end() <= node.end());
        assert_depths(child);
    }
}

#[test]
fn range_spans_first_to_last_sample_in_microseconds() {
    let capture = parse_reference();

    let range = capture.range();
    assert_eq!(range.min_us, 10_000);
    assert_eq!(range.max_us, 10_030);
}

#[test]
fn main_process_is_present() {
    let capture = parse_reference();

    assert_eq!(capture.main_thread_id(), Some(MAIN_TID));
    assert!(capture.capture_node(MAIN_TID).is_some());
}

#[test]
fn thread_roots_begin_with_start_thread_prologue() {
    let capture = parse_reference();

    for thread in capture.threads() {
        let root = capture.capture_node(thread.id).unwrap();
        let start_thread = root.child_at(0).unwrap();
        assert!(start_thread.data().full_name().starts_with("__start_thread"));
        let pthread_start = start_thread.child_at(0).unwrap();
        assert!(pthread_start
            .data()
            .full_name()
            .starts_with("__pthread_start"));
        assert!(pthread_start.child_at(0).is_some());
    }
}

#[test]
fn identical_chains_merge_into_prefix_nodes() {
    let capture = parse_reference();
    let root = capture.capture_node(MAIN_TID).unwrap();

    // Three main-thread samples share the whole prefix; the only extra node
    // is the trailing __ioctl, and the empty sample adds nothing.
    // root -> __start_thread -> __pthread_start -> render_frame -> compute
    //      -> mix -> __ioctl
    let mut node = root;
    let expected = [
        "__start_thread",
        "__pthread_start",
        "render_frame",
        "compute",
        "mix",
        "__ioctl",
    ];
    for name in expected {
        assert_eq!(node.child_count(), 1);
        node = node.first_child().unwrap();
        assert_eq!(node.data().name(), name);
    }
    assert_eq!(node.child_count(), 0);

    // The empty chain extended the root beyond every frame node.
    assert_eq!(root.end(), 10_030_000);
    assert_eq!(root.first_child().unwrap().end(), 10_020_000);
}

#[test]
fn syscall_leaf_is_classified_and_tagged() {
    let capture = parse_reference();
    let root = capture.capture_node(MAIN_TID).unwrap();

    let mut node = root;
    while let Some(child) = node.first_child() {
        node = child;
    }

    assert!(matches!(node.data(), NodeModel::Syscall { .. }));
    assert_eq!(node.data().name(), "__ioctl");
    assert_eq!(
        node.data().tag(),
        Some("/apex/com.android.runtime/lib64/bionic/*")
    );
}

#[test]
fn java_frames_resolve_to_java_methods() {
    let capture = parse_reference();
    let root = capture.capture_node(RENDER_TID).unwrap();

    let mut node = root;
    while let Some(child) = node.first_child() {
        node = child;
    }

    assert!(matches!(node.data(), NodeModel::JavaMethod { .. }));
    assert_eq!(node.data().name(), "onCreate");
}

#[test]
fn native_v_address_comes_from_parent_chain_entry() {
    // Dedicated fixture: one thread, one chain, so the leftmost branch is
    // exactly the reversed chain under the thread root.
    let chain = with_prologue(&[(0x30, 1, 2), (0x20, 1, 1), (0x10, 1, 0)]);
    let mut records = file_table();
    records.push(thread_record(MAIN_TID, MAIN_TID, "e.sample.tunnel"));
    records.push(sample_record(MAIN_TID, 1_000_000, &chain));
    let capture = parse_capture(&frame(&records)).unwrap();

    let reversed: Vec<_> = chain.iter().rev().collect();
    let mut branch = Vec::new();
    let mut node = Some(capture.capture_node(MAIN_TID).unwrap());
    while let Some(current) = node {
        branch.push(current);
        node = current.first_child();
    }

    // Branch is the callchain plus the synthetic thread node.
    assert_eq!(branch.len(), reversed.len() + 1);
    assert_eq!(branch[0].data().name(), "e.sample.tunnel");

    let mut native_count = 0;
    for i in 1..reversed.len() {
        let data = branch[i + 1].data();
        if let NodeModel::NativeFunction { .. } = data {
            native_count += 1;
            let parent_vaddr = reversed[i - 1].0;
            assert_eq!(data.v_address(), Some(parent_vaddr));
        }
    }
    assert!(native_count > 0);
}

#[test]
fn reparsing_identical_bytes_yields_identical_trees() {
    let bytes = reference_trace();

    let first = parse_capture(&bytes).unwrap();
    let second = parse_capture(&bytes).unwrap();

    assert_eq!(first.threads(), second.threads());
    assert_eq!(first.range(), second.range());
    for thread in first.threads() {
        assert_same_shape(
            first.capture_node(thread.id).unwrap(),
            second.capture_node(thread.id).unwrap(),
        );
    }
}

fn assert_same_shape(a: NodeRef<'_>, b: NodeRef<'_>) {
    assert_eq!(a.data().id(), b.data().id());
    assert_eq!(a.start(), b.start());
    assert_eq!(a.end(), b.end());
    assert_eq!(a.depth(), b.depth());
    assert_eq!(a.child_count(), b.child_count());
    for i in 0..a.child_count() {
        assert_same_shape(a.child_at(i).unwrap(), b.child_at(i).unwrap());
    }
}

#[test]
fn corrupted_magic_fails_without_a_capture() {
    let mut bytes = reference_trace();
    bytes[0] = b'X';

    let temp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), &bytes).unwrap();

    let err = parse_capture_file(temp.path()).unwrap_err();

    assert!(matches!(
        err,
        TraceError::Format(FormatError::MagicNumberMismatch)
    ));
    assert!(err.to_string().contains("magic number mismatch"));
}

#[test]
fn missing_file_surfaces_io_error() {
    let err = parse_capture_file("/nonexistent/trace.data").unwrap_err();
    assert!(matches!(err, TraceError::Io(_)));
}

#[test]
fn truncated_trace_fails_without_a_capture() {
    let mut bytes = reference_trace();
    bytes.truncate(bytes.len() - 3);

    let err = parse_capture(&bytes).unwrap_err();

    assert!(matches!(err, FormatError::TruncatedRecord { .. }));
}
