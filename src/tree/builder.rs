//! Call-tree construction from the chronological sample stream.
//!
//! Chains are recorded innermost frame first; the tree is rooted at the
//! thread, so each chain is walked outermost-first and merged against the
//! open path of the thread's tree. The fold is a deterministic
//! left-to-right pass with no lookahead.

use std::collections::BTreeMap;

use log::debug;

use super::CaptureTree;
use crate::parser::proto::{Sample, Thread};
use crate::resolver::{FrameResolver, NodeModel};

/// Fold samples into one merged call tree per thread
///
/// # Arguments
/// * `samples` - Decoded samples in recorded (chronological) order
/// * `resolver` - Frame resolver over the trace's file table
/// * `threads` - Thread registry used to name the synthetic roots
pub fn build_thread_trees(
    samples: &[Sample],
    resolver: &FrameResolver<'_>,
    threads: &BTreeMap<i32, Thread>,
) -> BTreeMap<i32, CaptureTree> {
    let mut trees: BTreeMap<i32, CaptureTree> = BTreeMap::new();

    for sample in samples {
        let thread_id = sample.thread_id;
        let timestamp = sample.time as i64;

        let tree = trees.entry(thread_id).or_insert_with(|| {
            let name = threads
                .get(&thread_id)
                .map(|thread| thread.thread_name.clone())
                .unwrap_or_else(|| format!("thread-{}", thread_id));
            CaptureTree::with_root(NodeModel::Thread { name }, timestamp)
        });

        append_sample(tree, resolver, sample, timestamp);
    }

    debug!(
        "Built {} thread trees from {} samples",
        trees.len(),
        samples.len()
    );

    trees
}

/// Merge one sample's chain into its thread tree
fn append_sample(
    tree: &mut CaptureTree,
    resolver: &FrameResolver<'_>,
    sample: &Sample,
    timestamp: i64,
) {
    // An empty chain still extends the root: the thread was running.
    let mut current = tree.root_id();
    tree.extend_span(current, timestamp);

    let chain = &sample.callchain;
    for (reversed_index, entry) in chain.iter().rev().enumerate() {
        // The entry one step closer to the root carries this frame's call
        // site; in recorded (innermost-first) order that is the next entry.
        let parent_entry = if reversed_index == 0 {
            None
        } else {
            chain.get(chain.len() - reversed_index)
        };

        let model = resolver.resolve(entry, parent_entry);
        current = tree.extend_or_append(current, model, timestamp);
    }
}
