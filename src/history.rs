//! Bounded linear undo/redo.
//!
//! Entries are whole-graph snapshots taken *before* each committed mutation.
//! Undo hands back the previous state and remembers the current one for redo;
//! any new commit discards the redo branch.

use std::collections::VecDeque;

use crate::graph::GraphSnapshot;
use log::trace;

/// Toolbar-facing availability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
}

#[derive(Debug, Clone)]
pub struct HistoryController<S = GraphSnapshot> {
    undo: VecDeque<S>,
    redo: Vec<S>,
    depth: usize,
}

impl<S> Default for HistoryController<S> {
    fn default() -> Self {
        Self::new(50)
    }
}

impl<S> HistoryController<S> {
    /// A depth of zero is treated as one.
    pub fn new(depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// Record the state before a mutation. Clears the redo stack and evicts
    /// the oldest entry past the depth bound.
    pub fn commit(&mut self, before: S) {
        self.redo.clear();
        self.push_undo(before);
    }

    fn push_undo(&mut self, state: S) {
        self.undo.push_back(state);
        while self.undo.len() > self.depth {
            self.undo.pop_front();
            trace!("history full, evicted oldest entry");
        }
    }

    /// Step back. `current` is the live state, kept for redo. Returns the
    /// state to restore, or `None` when there is nothing to undo.
    pub fn undo(&mut self, current: S) -> Option<S> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Step forward. Returns the state to restore, or `None` when there is
    /// nothing to redo.
    pub fn redo(&mut self, current: S) -> Option<S> {
        let next = self.redo.pop()?;
        self.push_undo(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn state(&self) -> HistoryState {
        HistoryState {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
