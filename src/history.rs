//! Bounded undo/redo history of full-canvas snapshots.
//!
//! The history never inspects its snapshots; the engine stores copies of the
//! committed layer and swaps them back in on undo/redo.

use log::debug;
use std::collections::VecDeque;

/// Default number of snapshots kept on each stack.
pub const DEFAULT_MAX_DEPTH: usize = 20;

/// Undo and redo stacks, most recent entry last.
///
/// Both stacks are capped at `max_depth`; pushing past the cap evicts the
/// oldest snapshot.
pub struct History<S> {
    undo_stack: VecDeque<S>,
    redo_stack: VecDeque<S>,
    max_depth: usize,
}

impl<S> History<S> {
    /// Creates an empty history holding at most `max_depth` snapshots per stack.
    ///
    /// A depth of zero is bumped to one so a single undo always works.
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Stores the committed state taken before a new action.
    ///
    /// Any new action invalidates the redo stack.
    pub fn record_snapshot(&mut self, snapshot: S) {
        Self::push_bounded(&mut self.undo_stack, snapshot, self.max_depth);
        if !self.redo_stack.is_empty() {
            debug!("Dropping {} redo snapshot(s)", self.redo_stack.len());
            self.redo_stack.clear();
        }
    }

    /// Steps back one action.
    ///
    /// Returns the snapshot to restore, or `None` (leaving both stacks untouched)
    /// when there is nothing to undo.
    pub fn undo(&mut self, current: S) -> Option<S> {
        let previous = self.undo_stack.pop_back()?;
        Self::push_bounded(&mut self.redo_stack, current, self.max_depth);
        Some(previous)
    }

    /// Steps forward one undone action; the mirror of [`History::undo`].
    pub fn redo(&mut self, current: S) -> Option<S> {
        let next = self.redo_stack.pop_back()?;
        Self::push_bounded(&mut self.undo_stack, current, self.max_depth);
        Some(next)
    }

    /// Removes the most recent undo snapshot without touching the redo stack.
    ///
    /// Used when an action that already recorded its snapshot is abandoned.
    pub fn discard_last(&mut self) -> Option<S> {
        self.undo_stack.pop_back()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Drops every snapshot.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn push_bounded(stack: &mut VecDeque<S>, snapshot: S, max_depth: usize) {
        stack.push_back(snapshot);
        while stack.len() > max_depth {
            stack.pop_front();
            debug!("History depth {max_depth} reached; evicted oldest snapshot");
        }
    }
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}
