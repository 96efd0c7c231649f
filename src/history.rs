//! Undo/redo history over full-scene snapshots.
//!
//! Three buckets: `past` (older to newer), `present` (the committed state),
//! and `future` (snapshots available for redo). Snapshots are structurally
//! independent clones — the engine keeps its own live scene and hands this
//! module copies, never the live value.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use crate::consts::HISTORY_CAP;
use crate::doc::Scene;

/// Bounded snapshot history.
///
/// Depth is capped at `cap` past entries; committing beyond the cap evicts
/// the oldest snapshot. The bound is a deliberate design decision — the
/// original behavior was unbounded, which grows memory without limit over
/// a long session.
pub struct History {
    past: Vec<Scene>,
    present: Scene,
    future: Vec<Scene>,
    cap: usize,
}

impl History {
    /// A history rooted at `initial` with the default cap.
    #[must_use]
    pub fn new(initial: Scene) -> Self {
        Self::with_cap(initial, HISTORY_CAP)
    }

    /// A history rooted at `initial` keeping at most `cap` past snapshots.
    #[must_use]
    pub fn with_cap(initial: Scene, cap: usize) -> Self {
        Self { past: Vec::new(), present: initial, future: Vec::new(), cap: cap.max(1) }
    }

    /// The current committed snapshot.
    #[must_use]
    pub fn present(&self) -> &Scene {
        &self.present
    }

    /// Commit a new snapshot: the old present moves into `past` and any
    /// redo history is invalidated. This is a hard rule — after a commit,
    /// redo is unavailable regardless of prior redo depth.
    pub fn commit(&mut self, next: Scene) {
        self.past.push(std::mem::replace(&mut self.present, next));
        self.future.clear();
        while self.past.len() > self.cap {
            self.past.remove(0);
        }
    }

    /// Step back one snapshot. Silent no-op at the boundary; returns whether
    /// a step was taken.
    pub fn undo(&mut self) -> bool {
        let Some(prev) = self.past.pop() else {
            return false;
        };
        self.future.push(std::mem::replace(&mut self.present, prev));
        true
    }

    /// Step forward one snapshot. Silent no-op at the boundary; returns
    /// whether a step was taken.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        self.past.push(std::mem::replace(&mut self.present, next));
        true
    }

    /// Whether an undo step is available. Callers gate the affordance here
    /// rather than treating a boundary undo as an error.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether a redo step is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of undo steps available.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    /// Number of redo steps available.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    /// Re-root the history at `initial`, clearing both stacks. Used when a
    /// session loads a persisted document.
    pub fn reset(&mut self, initial: Scene) {
        self.past.clear();
        self.future.clear();
        self.present = initial;
    }
}
