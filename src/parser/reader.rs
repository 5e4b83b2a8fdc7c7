//! Trace reader for simpleperf report files.
//!
//! Validates the fixed-offset header, then walks the length-prefixed record
//! stream and collects the decoded records. Any structural problem aborts
//! the whole read; callers never see a partial stream.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, warn};
use prost::Message;

use super::proto::{self, record::RecordData};
use crate::utils::config::{TRACE_MAGIC, TRACE_VERSION};
use crate::utils::error::{FormatError, TraceError};

/// Everything decoded from one trace file.
///
/// Samples keep their recorded (chronological) order. The counters come from
/// the stream's embedded `LostSituation` records, not from re-counting.
#[derive(Debug, Default)]
pub struct RecordStream {
    pub samples: Vec<proto::Sample>,
    pub files: HashMap<u32, proto::File>,
    pub threads: BTreeMap<i32, proto::Thread>,
    pub meta_info: Option<proto::MetaInfo>,
    pub sample_count: u64,
    pub lost_sample_count: u64,
}

/// Read and decode a trace file
///
/// # Arguments
/// * `path` - Path to a simpleperf trace file
///
/// # Errors
/// * `TraceError::Io` - file missing or unreadable, surfaced unchanged
/// * `TraceError::Format` - header or record framing violation
pub fn read_trace(path: impl AsRef<Path>) -> Result<RecordStream, TraceError> {
    let path = path.as_ref();
    debug!("Reading trace file: {}", path.display());

    let bytes = fs::read(path)?;
    Ok(decode_records(&bytes)?)
}

/// Decode a complete trace byte buffer
///
/// Header layout: 10 magic bytes, then a little-endian u16 version. The body
/// is a sequence of `[u32 LE length][record]` frames until end of input; a
/// zero length terminates the stream early (writer end marker).
pub fn decode_records(bytes: &[u8]) -> Result<RecordStream, FormatError> {
    let mut pos = verify_header(bytes)?;
    let mut stream = RecordStream::default();

    while pos < bytes.len() {
        let remaining = bytes.len() - pos;
        if remaining < 4 {
            return Err(FormatError::TruncatedLength { offset: pos });
        }
        let declared = LittleEndian::read_u32(&bytes[pos..pos + 4]) as usize;
        pos += 4;
        if declared == 0 {
            break;
        }
        if bytes.len() - pos < declared {
            return Err(FormatError::TruncatedRecord {
                offset: pos,
                declared,
                remaining: bytes.len() - pos,
            });
        }

        let record = proto::Record::decode(&bytes[pos..pos + declared])
            .map_err(|source| FormatError::MalformedRecord { offset: pos, source })?;
        collect_record(&mut stream, record, pos);
        pos += declared;
    }

    debug!(
        "Decoded {} samples, {} files, {} threads",
        stream.samples.len(),
        stream.files.len(),
        stream.threads.len()
    );

    Ok(stream)
}

/// Check magic and version, returning the offset of the first record frame
fn verify_header(bytes: &[u8]) -> Result<usize, FormatError> {
    if bytes.len() < TRACE_MAGIC.len() || &bytes[..TRACE_MAGIC.len()] != TRACE_MAGIC {
        return Err(FormatError::MagicNumberMismatch);
    }
    let pos = TRACE_MAGIC.len();
    if bytes.len() < pos + 2 {
        return Err(FormatError::ShortHeader);
    }
    let version = LittleEndian::read_u16(&bytes[pos..pos + 2]);
    if version != TRACE_VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }
    Ok(pos + 2)
}

/// Sort one decoded record into the stream's collections
fn collect_record(stream: &mut RecordStream, record: proto::Record, offset: usize) {
    match record.record_data {
        Some(RecordData::Sample(sample)) => stream.samples.push(sample),
        Some(RecordData::Lost(lost)) => {
            // Running counters; the agent may emit more than one.
            stream.sample_count += lost.sample_count;
            stream.lost_sample_count += lost.lost_count;
        }
        Some(RecordData::File(file)) => {
            stream.files.insert(file.id, file);
        }
        Some(RecordData::Thread(thread)) => {
            stream.threads.insert(thread.thread_id, thread);
        }
        Some(RecordData::MetaInfo(meta)) => stream.meta_info = Some(meta),
        None => warn!("Record at offset {} carries no payload, skipping", offset),
    }
}
