//! Frame resolution: raw call-chain entries to classified node models.
//!
//! Consults the symbol/file tables decoded from the trace. Classification
//! is JVM method / syscall / native function; missing symbol data degrades
//! to an address-derived placeholder instead of failing the parse.

pub mod model;
pub mod tags;

use std::collections::HashMap;

use log::warn;

use crate::parser::proto::{CallChainEntry, File};
use crate::utils::config::{
    JVM_MANAGED_SUFFIXES, KERNEL_SYMBOL_FILE, KERNEL_SYSCALL_PREFIXES, LIBC_SYSCALL_WRAPPERS,
};

pub use model::NodeModel;
pub use tags::tag_order;

/// Resolves call-chain entries against the trace's file table.
pub struct FrameResolver<'a> {
    files: &'a HashMap<u32, File>,
}

impl<'a> FrameResolver<'a> {
    pub fn new(files: &'a HashMap<u32, File>) -> Self {
        Self { files }
    }

    /// Resolve one chain entry to a node model
    ///
    /// `parent` is the chain entry one step closer to the thread root. Its
    /// recorded address is the call site into this frame, which is what a
    /// native frame caches as `v_address`; the outermost frame falls back
    /// to its own address.
    pub fn resolve(&self, entry: &CallChainEntry, parent: Option<&CallChainEntry>) -> NodeModel {
        let v_address = parent.map_or(entry.vaddr_in_file, |p| p.vaddr_in_file);

        let Some(file) = self.files.get(&entry.file_id) else {
            warn!(
                "No file table entry for id {}, using address placeholder",
                entry.file_id
            );
            let name = format!("unknown (0x{:x})", entry.vaddr_in_file);
            return NodeModel::NativeFunction {
                full_name: name.clone(),
                name,
                id: placeholder_id(entry),
                v_address,
            };
        };

        let symbol = usize::try_from(entry.symbol_id)
            .ok()
            .and_then(|index| file.symbol.get(index));

        let Some(symbol) = symbol else {
            warn!(
                "Symbol {} missing from {}, using address placeholder",
                entry.symbol_id, file.path
            );
            let name = format!(
                "{}+0x{:x}",
                file_basename(&file.path),
                entry.vaddr_in_file
            );
            return NodeModel::NativeFunction {
                full_name: name.clone(),
                name,
                id: placeholder_id(entry),
                v_address,
            };
        };

        if is_jvm_managed(&file.path) {
            return java_method(symbol, entry);
        }
        if let Some(tag) = syscall_tag(&file.path, symbol) {
            return NodeModel::Syscall {
                tag,
                name: symbol.clone(),
            };
        }
        native_function(symbol, entry, v_address)
    }
}

/// Merge identity of a resolved frame: file plus symbol, never the name
fn symbol_id(entry: &CallChainEntry) -> String {
    format!("{}:{}", entry.file_id, entry.symbol_id)
}

/// Merge identity of a frame without symbol data
fn placeholder_id(entry: &CallChainEntry) -> String {
    format!("{}:0x{:x}", entry.file_id, entry.vaddr_in_file)
}

fn java_method(symbol: &str, entry: &CallChainEntry) -> NodeModel {
    // Managed symbols render as "package.Class.method(signature)"; the short
    // name is the last dotted component without the signature.
    let stripped = symbol.split('(').next().unwrap_or(symbol);
    let name = stripped.rsplit('.').next().unwrap_or(stripped);
    NodeModel::JavaMethod {
        name: name.to_string(),
        full_name: symbol.to_string(),
        id: symbol_id(entry),
    }
}

fn native_function(symbol: &str, entry: &CallChainEntry, v_address: u64) -> NodeModel {
    let name = symbol.split('(').next().unwrap_or(symbol);
    NodeModel::NativeFunction {
        name: name.to_string(),
        full_name: symbol.to_string(),
        id: symbol_id(entry),
        v_address,
    }
}

fn is_jvm_managed(path: &str) -> bool {
    JVM_MANAGED_SUFFIXES
        .iter()
        .any(|suffix| path.ends_with(suffix))
}

/// Grouping tag for syscall frames, or None for ordinary native code
fn syscall_tag(path: &str, symbol: &str) -> Option<String> {
    if path == KERNEL_SYMBOL_FILE {
        if KERNEL_SYSCALL_PREFIXES
            .iter()
            .any(|prefix| symbol.starts_with(prefix))
        {
            return Some(path.to_string());
        }
        return None;
    }
    // libc syscall wrappers (__ioctl, __openat, ...) collapse under a
    // wildcard tag for the owning directory.
    if file_basename(path).contains("libc.so") && LIBC_SYSCALL_WRAPPERS.contains(&symbol) {
        return Some(wildcard_tag(path));
    }
    None
}

fn file_basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn wildcard_tag(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, _)) => format!("{}/*", dir),
        None => "*".to_string(),
    }
}
