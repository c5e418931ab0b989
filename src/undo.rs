//! Snapshot undo history.
//!
//! Callers push a full copy of the state BEFORE changing it; undo hands the
//! most recent copy back. There is no redo: a popped snapshot is gone.

/// Stack of prior states for any cloneable value.
///
/// ```
/// use annotrace::undo::UndoHistory;
///
/// let mut history: UndoHistory<Vec<u32>> = UndoHistory::new();
/// let mut items = vec![1];
///
/// history.push(items.clone());
/// items.push(2);
///
/// if let Some(previous) = history.pop() {
///     items = previous;
/// }
/// assert_eq!(items, vec![1]);
/// ```
#[derive(Debug, Clone)]
pub struct UndoHistory<T: Clone> {
    snapshots: Vec<T>,
    /// Oldest snapshots are dropped beyond this many; None keeps everything.
    max_history: Option<usize>,
}

impl<T: Clone> Default for UndoHistory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> UndoHistory<T> {
    /// Create an unbounded history.
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    /// Create a history that keeps at most `max_history` snapshots.
    pub fn with_limit(max_history: Option<usize>) -> Self {
        Self {
            snapshots: Vec::new(),
            max_history,
        }
    }

    /// Record the current state (call this BEFORE making a change).
    pub fn push(&mut self, state: T) {
        self.snapshots.push(state);

        let len = self.snapshots.len();
        if let Some(max) = self.max_history.filter(|max| len > *max) {
            self.snapshots.drain(..len - max);
        }
    }

    /// Remove and return the most recent snapshot.
    pub fn pop(&mut self) -> Option<T> {
        self.snapshots.pop()
    }

    pub fn can_undo(&self) -> bool {
        !self.snapshots.is_empty()
    }

    /// Number of snapshots available.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn max_history(&self) -> Option<usize> {
        self.max_history
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_returns_latest_first() {
        let mut history = UndoHistory::new();
        history.push(1);
        history.push(2);
        history.push(3);

        assert_eq!(history.pop(), Some(3));
        assert_eq!(history.pop(), Some(2));
        assert_eq!(history.pop(), Some(1));
        assert_eq!(history.pop(), None);
    }

    #[test]
    fn test_empty_history() {
        let mut history: UndoHistory<String> = UndoHistory::default();
        assert!(!history.can_undo());
        assert!(history.is_empty());
        assert_eq!(history.pop(), None);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = UndoHistory::with_limit(Some(2));
        history.push("a");
        history.push("b");
        history.push("c");

        assert_eq!(history.len(), 2);
        assert_eq!(history.pop(), Some("c"));
        assert_eq!(history.pop(), Some("b"));
        assert_eq!(history.pop(), None);
    }

    #[test]
    fn test_snapshots_are_copies() {
        let mut history = UndoHistory::new();
        let mut live = vec![1, 2];
        history.push(live.clone());
        live.push(3);

        assert_eq!(history.pop(), Some(vec![1, 2]));
    }

    #[test]
    fn test_clear() {
        let mut history = UndoHistory::new();
        history.push(1);
        history.clear();
        assert!(!history.can_undo());
    }
}
