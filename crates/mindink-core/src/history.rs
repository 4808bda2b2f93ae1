//! Bounded, linear undo/redo history over deep tree snapshots.

use crate::node::{Node, NodeId};
use std::collections::HashMap;

/// Maximum number of snapshots to keep. Oldest entries are dropped once
/// exceeded, so deep undo bottoms out at the oldest retained state.
pub const MAX_HISTORY: usize = 50;

/// An immutable deep copy of the tree at a point in time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub nodes: HashMap<NodeId, Node>,
    pub root: Option<NodeId>,
}

/// Linear history: a snapshot list plus an index pointer.
///
/// `undo`/`redo` move the pointer; a new snapshot after an undo truncates the
/// abandoned future before appending.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    index: usize,
}

impl History {
    /// Create a history whose oldest entry is the given initial state.
    pub fn new(initial: Snapshot) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    /// Append a snapshot after the current index, discarding any redo
    /// entries beyond it and dropping the oldest entry past the cap.
    pub fn record(&mut self, snapshot: Snapshot) {
        self.entries.truncate(self.index + 1);
        self.entries.push(snapshot);
        if self.entries.len() > MAX_HISTORY {
            self.entries.remove(0);
        }
        self.index = self.entries.len() - 1;
    }

    /// Step back one snapshot. No-op at the oldest entry.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.entries[self.index])
    }

    /// Step forward one snapshot. No-op at the newest entry.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(&self.entries[self.index])
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Number of retained snapshots; at least 1, since the initial state is
    /// always kept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
