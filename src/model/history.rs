//! Snapshot undo/redo for whole-collection replacement.

use super::collection::Collection;

/// Undo/redo history over collection snapshots.
///
/// The model's only mutation is replacing the whole collection, so
/// history reduces to two stacks of snapshots: [`replace`](History::replace)
/// pushes the prior state onto the undo stack and clears redo, while
/// [`undo`](History::undo) and [`redo`](History::redo) move the current
/// snapshot between the stacks. The inverse of replacing A with B is
/// replacing B with A; there is no patch or merge logic.
#[derive(Clone, Debug, Default)]
pub struct History {
    current: Collection,
    undo_stack: Vec<Collection>,
    redo_stack: Vec<Collection>,
}

impl History {
    /// Starts a history at the given snapshot with empty stacks.
    pub fn new(initial: Collection) -> Self {
        Self {
            current: initial,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// The current snapshot.
    pub fn current(&self) -> &Collection {
        &self.current
    }

    /// Replaces the current snapshot, remembering the prior one.
    ///
    /// Editing after an undo forks the timeline: any redoable snapshots
    /// are discarded.
    pub fn replace(&mut self, next: Collection) {
        let prior = std::mem::replace(&mut self.current, next);
        self.undo_stack.push(prior);
        self.redo_stack.clear();
    }

    /// Steps back one snapshot. Returns false (and changes nothing) when
    /// there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(prior) => {
                let undone = std::mem::replace(&mut self.current, prior);
                self.redo_stack.push(undone);
                true
            }
            None => false,
        }
    }

    /// Steps forward one snapshot. Returns false (and changes nothing)
    /// when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(next) => {
                let redone = std::mem::replace(&mut self.current, next);
                self.undo_stack.push(redone);
                true
            }
            None => false,
        }
    }

    /// Returns true if an undo step is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if a redo step is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}
