//! Lock keys and the path conflict relation

use confstore_core::PathDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How two flattened paths are compared for contention.
///
/// `SegmentSet` treats a flattened path as an unordered set of segments and
/// reports a conflict when one set contains the other. Different orderings of
/// the same segments therefore collide, and repeated segments collapse. It
/// never misses a real ancestor/descendant conflict, only adds spurious ones.
///
/// `OrderedPrefix` reports a conflict only when one path is an ordered
/// prefix of the other, i.e. a true ancestor, descendant or the same node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictMode {
    /// Set containment over segments
    #[default]
    SegmentSet,
    /// Ordered prefix over segments
    OrderedPrefix,
}

/// Key identifying a flattened path in the lock tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathKey {
    /// Unordered, deduplicated segments
    Set(BTreeSet<String>),
    /// Segments in path order
    Ordered(Vec<String>),
}

impl PathKey {
    /// Build the key for `path` under `mode`.
    pub fn new(path: &PathDescriptor, mode: ConflictMode) -> Self {
        let segments = path.flatten().into_iter().map(str::to_string);
        match mode {
            ConflictMode::SegmentSet => PathKey::Set(segments.collect()),
            ConflictMode::OrderedPrefix => PathKey::Ordered(segments.collect()),
        }
    }

    /// Whether the two keys address overlapping subtrees (or the same node).
    ///
    /// Keys built under different modes never conflict; a manager only ever
    /// builds keys under its own mode.
    pub fn conflicts_with(&self, other: &PathKey) -> bool {
        match (self, other) {
            (PathKey::Set(a), PathKey::Set(b)) => a.is_subset(b) || b.is_subset(a),
            (PathKey::Ordered(a), PathKey::Ordered(b)) => {
                let n = a.len().min(b.len());
                a[..n] == b[..n]
            }
            _ => false,
        }
    }
}
