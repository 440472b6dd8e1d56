use super::identity::Fingerprint;
use indextree::NodeId;
use std::collections::{HashMap, HashSet};

/// Nodes wrapped during one run over one tree.
#[derive(Debug, Default)]
pub struct ProcessedRegistry {
    processed: HashSet<NodeId>,
    containers: HashSet<NodeId>,
    /// Batch ordinals already wrapped, per fingerprint and cell scoping.
    wrapped: HashMap<(Fingerprint, bool), Vec<usize>>,
}

impl ProcessedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_processed(&self, node: NodeId) -> bool {
        self.processed.contains(&node)
    }

    /// True for a `w:sdtContent` this run created.
    pub fn is_container(&self, node: NodeId) -> bool {
        self.containers.contains(&node)
    }

    /// Record that `node` now lives inside `container`.
    pub fn mark_processed(&mut self, node: NodeId, container: NodeId) {
        self.processed.insert(node);
        self.containers.insert(container);
    }

    /// Record which same-fingerprint ordinal a wrap consumed.
    /// `inline_level` keeps cell-scoped ordinals apart from block ones.
    pub fn record_match(&mut self, fingerprint: &Fingerprint, inline_level: bool, ordinal: usize) {
        self.wrapped
            .entry((fingerprint.clone(), inline_level))
            .or_default()
            .push(ordinal);
    }

    /// How many nodes with this fingerprint and scoping were wrapped for
    /// ordinals lower than `ordinal`.
    pub fn wrapped_before(&self, fingerprint: &Fingerprint, inline_level: bool, ordinal: usize) -> usize {
        self.wrapped
            .get(&(fingerprint.clone(), inline_level))
            .map_or(0, |ordinals| ordinals.iter().filter(|&&o| o < ordinal).count())
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}
