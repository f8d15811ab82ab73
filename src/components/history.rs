use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

// ============================================================================
// SNAPSHOT — immutable encoded canvas state
// ============================================================================

/// One point in the edit timeline: the full canvas bitmap, PNG-encoded.
/// Snapshots are never mutated after creation.
#[derive(Clone)]
pub struct Snapshot {
    /// PNG-encoded RGBA bitmap.
    pub content: Vec<u8>,
    /// Wall-clock creation time in milliseconds since the Unix epoch.
    pub created_at_ms: i64,
    pub width: u32,
    pub height: u32,
}

impl Snapshot {
    /// Wrap already-encoded content with a creation timestamp.
    pub fn new(content: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            content,
            created_at_ms: now_ms(),
            width,
            height,
        }
    }

    pub fn memory_size(&self) -> usize {
        self.content.len()
    }
}

/// Milliseconds since the Unix epoch (0 if the clock is before 1970).
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

// ============================================================================
// EDIT HISTORY — bounded undo/redo stacks for the current session
// ============================================================================

/// Default cap on the undo stack. When a push exceeds it, the oldest
/// snapshot is evicted.
pub const DEFAULT_HISTORY_BOUND: usize = 20;

/// Linear, branch-free undo/redo timeline of canvas snapshots.
///
/// Invariants:
/// - the undo stack is never empty while an image is active (the initial
///   loaded state cannot be undone past);
/// - the undo stack never exceeds `bound` entries;
/// - any push clears the redo stack;
/// - the currently displayed state is always the back of the undo stack.
pub struct EditHistory {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    bound: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_BOUND)
    }
}

impl EditHistory {
    pub fn new(bound: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            bound: bound.max(1),
        }
    }

    /// Append a new snapshot. Evicts the oldest entry past the bound and
    /// unconditionally clears the redo stack. Always succeeds.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.redo_stack.clear();
        self.undo_stack.push_back(snapshot);
        while self.undo_stack.len() > self.bound {
            self.undo_stack.pop_front();
        }
    }

    /// Step back one edit. No-op (`None`) when only the initial state
    /// remains. Returns the newly-current snapshot; the caller is
    /// responsible for re-rendering it.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.undo_stack.len() <= 1 {
            return None;
        }
        // len > 1 checked above, pop cannot fail
        if let Some(top) = self.undo_stack.pop_back() {
            self.redo_stack.push(top);
        }
        self.undo_stack.back()
    }

    /// Restore the most recently undone snapshot. No-op (`None`) when the
    /// redo stack is empty.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        let restored = self.redo_stack.pop()?;
        self.undo_stack.push_back(restored);
        while self.undo_stack.len() > self.bound {
            self.undo_stack.pop_front();
        }
        self.undo_stack.back()
    }

    /// Clear both stacks. Invoked on image removal or when loading a
    /// different base image.
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// The currently displayed snapshot, if an image is active.
    pub fn current(&self) -> Option<&Snapshot> {
        self.undo_stack.back()
    }

    /// Oldest retained snapshot (front of the undo stack).
    pub fn oldest(&self) -> Option<&Snapshot> {
        self.undo_stack.front()
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Total bytes held across both stacks.
    pub fn memory_usage(&self) -> usize {
        self.undo_stack.iter().map(|s| s.memory_size()).sum::<usize>()
            + self.redo_stack.iter().map(|s| s.memory_size()).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(tag: u8) -> Snapshot {
        Snapshot::new(vec![tag], 1, 1)
    }

    #[test]
    fn push_respects_bound_and_keeps_most_recent() {
        let mut history = EditHistory::new(20);
        for i in 0..25u8 {
            history.push(snap(i));
        }
        assert_eq!(history.len(), 20);
        // Oldest retained entry is push #6 (0-indexed #5).
        assert_eq!(history.oldest().map(|s| s.content[0]), Some(5));
        assert_eq!(history.current().map(|s| s.content[0]), Some(24));
    }

    #[test]
    fn undo_then_redo_restores_exact_snapshot() {
        let mut history = EditHistory::default();
        history.push(snap(1));
        history.push(snap(2));
        let after_undo = history.undo().map(|s| s.content[0]);
        assert_eq!(after_undo, Some(1));
        let after_redo = history.redo().map(|s| s.content[0]);
        assert_eq!(after_redo, Some(2));
        assert_eq!(history.len(), 2);
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn push_after_undo_discards_redo() {
        let mut history = EditHistory::default();
        history.push(snap(1));
        history.push(snap(2));
        assert!(history.undo().is_some());
        assert_eq!(history.redo_len(), 1);
        history.push(snap(3));
        assert_eq!(history.redo_len(), 0);
        assert!(history.redo().is_none());
        assert_eq!(history.current().map(|s| s.content[0]), Some(3));
    }

    #[test]
    fn undo_on_single_entry_is_noop() {
        let mut history = EditHistory::default();
        history.push(snap(1));
        assert!(history.undo().is_none());
        assert_eq!(history.len(), 1);
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn redo_on_empty_redo_stack_is_noop() {
        let mut history = EditHistory::default();
        history.push(snap(1));
        history.push(snap(2));
        assert!(history.redo().is_none());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn reset_clears_both_stacks() {
        let mut history = EditHistory::default();
        history.push(snap(1));
        history.push(snap(2));
        history.undo();
        history.reset();
        assert!(history.is_empty());
        assert_eq!(history.redo_len(), 0);
        assert!(history.current().is_none());
    }

    #[test]
    fn interleaved_undo_and_push_keeps_bound() {
        let mut history = EditHistory::new(2);
        history.push(snap(1));
        history.push(snap(2));
        history.undo();
        assert_eq!(history.redo_len(), 1);
        history.push(snap(3));
        history.push(snap(4));
        assert_eq!(history.len(), 2);
        assert_eq!(history.redo_len(), 0);
        assert_eq!(history.current().map(|s| s.content[0]), Some(4));
    }
}
