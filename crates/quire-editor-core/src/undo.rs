//! Undo/redo history.
//!
//! Provides:
//! - `UndoManager` trait for abstracting undo implementations
//! - `History` - snapshot stack of (tree, range) pairs
//!
//! Snapshots hold key-preserving full clones of the tree, so a range can be
//! carried across by looking its elements up by key.

use crate::tree::Tree;
use crate::types::{Point, Range};

/// Trait for managing undo/redo operations.
///
/// Implementations must actually perform the undo/redo, not just track state.
pub trait UndoManager {
    /// Check if undo is available.
    fn can_undo(&self) -> bool;

    /// Check if redo is available.
    fn can_redo(&self) -> bool;

    /// Perform undo. Returns true if successful.
    fn undo(&mut self) -> bool;

    /// Perform redo. Returns true if successful.
    fn redo(&mut self) -> bool;

    /// Clear all undo/redo history.
    fn clear_history(&mut self);
}

/// Which way to step through history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

/// A committed document state.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub tree: Tree,
    pub range: Option<Range>,
}

impl Snapshot {
    /// Capture `tree` and `range`. The range is `None` when its elements are
    /// not reachable from the tree's stack.
    pub fn capture(tree: &Tree, range: Option<&Range>) -> Self {
        let clone = tree.full_clone();
        let range = range.and_then(|r| remap_range(tree, &clone, r));
        Self { tree: clone, range }
    }

    /// A fresh copy that shares nothing with this one.
    pub fn fresh(&self) -> Self {
        Self::capture(&self.tree, self.range.as_ref())
    }
}

/// Carry a range from `from` to `to` by element key.
pub fn remap_range(from: &Tree, to: &Tree, range: &Range) -> Option<Range> {
    let remap = |point: &Point| -> Option<Point> {
        let key = from.get(point.element)?.key();
        let element = to.find_by_key(key)?;
        Some(Point {
            element,
            offset: point.offset,
        })
    };
    Some(Range::new(remap(&range.anchor)?, remap(&range.focus)?))
}

/// Linear snapshot history with a current pointer.
#[derive(Clone, Debug)]
pub struct History {
    records: Vec<Snapshot>,
    current: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}

impl History {
    /// Create an empty history keeping at most `limit` snapshots.
    pub fn new(limit: usize) -> Self {
        Self {
            records: Vec::new(),
            current: 0,
            limit: limit.max(1),
        }
    }

    /// Record a new state, discarding any redo entries.
    pub fn push(&mut self, tree: &Tree, range: Option<&Range>) {
        let snapshot = Snapshot::capture(tree, range);
        if !self.records.is_empty() {
            self.records.truncate(self.current + 1);
        }
        self.records.push(snapshot);
        self.current = self.records.len() - 1;

        while self.records.len() > self.limit {
            self.records.remove(0);
            self.current -= 1;
        }

        tracing::trace!(
            target: "quire::history",
            len = self.records.len(),
            current = self.current,
            "pushed snapshot"
        );
    }

    /// Step in `direction`, returning a fresh copy of the reached snapshot,
    /// or `None` at either end.
    pub fn get(&mut self, direction: Direction) -> Option<Snapshot> {
        match direction {
            Direction::Undo => {
                if !self.can_undo() {
                    return None;
                }
                self.current -= 1;
            }
            Direction::Redo => {
                if !self.can_redo() {
                    return None;
                }
                self.current += 1;
            }
        }
        tracing::trace!(
            target: "quire::history",
            ?direction,
            current = self.current,
            "stepped history"
        );
        self.records.get(self.current).map(Snapshot::fresh)
    }

    /// Replace the range of the current snapshot without adding an entry.
    pub fn update_current_range(&mut self, tree: &Tree, range: &Range) {
        if let Some(record) = self.records.get_mut(self.current) {
            record.range = remap_range(tree, &record.tree, range);
        }
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.records.get(self.current)
    }

    pub fn current_index(&self) -> Option<usize> {
        (!self.records.is_empty()).then_some(self.current)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.records.is_empty() && self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.records.len()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.current = 0;
    }
}
