//! Record schema for the simpleperf report stream.
//!
//! The trace body is a sequence of length-prefixed protobuf messages.
//! Messages are hand-maintained `prost` structs with explicit field tags;
//! the wire schema is owned by the recording agent and changes rarely.

/// One framed record in the trace body.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Record {
    #[prost(oneof = "record::RecordData", tags = "1, 2, 3, 4, 5")]
    pub record_data: Option<record::RecordData>,
}

pub mod record {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum RecordData {
        #[prost(message, tag = "1")]
        Sample(super::Sample),
        #[prost(message, tag = "2")]
        Lost(super::LostSituation),
        #[prost(message, tag = "3")]
        File(super::File),
        #[prost(message, tag = "4")]
        Thread(super::Thread),
        #[prost(message, tag = "5")]
        MetaInfo(super::MetaInfo),
    }
}

/// A single stack sample. The callchain is recorded innermost frame first.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Sample {
    /// Sample timestamp in nanoseconds.
    #[prost(uint64, tag = "1")]
    pub time: u64,
    #[prost(int32, tag = "2")]
    pub thread_id: i32,
    #[prost(int32, tag = "3")]
    pub process_id: i32,
    #[prost(message, repeated, tag = "4")]
    pub callchain: Vec<CallChainEntry>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CallChainEntry {
    /// Virtual address of the frame inside its mapped file.
    #[prost(uint64, tag = "1")]
    pub vaddr_in_file: u64,
    /// Index into the trace's file table.
    #[prost(uint32, tag = "2")]
    pub file_id: u32,
    /// Index into the owning file's symbol table, or -1 when unresolved.
    #[prost(int32, tag = "3")]
    pub symbol_id: i32,
}

/// Counters the recording agent embeds at the end of the stream.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LostSituation {
    #[prost(uint64, tag = "1")]
    pub sample_count: u64,
    #[prost(uint64, tag = "2")]
    pub lost_count: u64,
}

/// A mapped binary and its symbol table.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct File {
    #[prost(uint32, tag = "1")]
    pub id: u32,
    #[prost(string, tag = "2")]
    pub path: String,
    #[prost(string, repeated, tag = "3")]
    pub symbol: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Thread {
    #[prost(int32, tag = "1")]
    pub thread_id: i32,
    #[prost(int32, tag = "2")]
    pub process_id: i32,
    #[prost(string, tag = "3")]
    pub thread_name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MetaInfo {
    #[prost(string, repeated, tag = "1")]
    pub event_type: Vec<String>,
    #[prost(string, tag = "2")]
    pub app_package_name: String,
}
