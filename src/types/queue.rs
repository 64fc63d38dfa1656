//! The queue state snapshot.

use serde::{Deserialize, Serialize};

use super::entry::QueuedEntry;

/// Connectivity flag plus the ordered buffer of deferred operations.
///
/// Snapshots are values: every transition returns a new `QueueState` and
/// never mutates the one it was given. Entries are retried in queue order;
/// re-admitting an entry moves it to the tail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueState {
    pub connected: bool,
    pub queue: Vec<QueuedEntry>,
}

impl QueueState {
    /// The state a fresh store starts in: connected, nothing queued.
    pub fn initial() -> Self {
        QueueState {
            connected: true,
            queue: Vec::new(),
        }
    }

    /// Copy of this state with `connected` replaced.
    pub fn with_connected(&self, connected: bool) -> Self {
        QueueState {
            connected,
            queue: self.queue.clone(),
        }
    }

    /// Copy of this state with the queue replaced.
    pub fn with_queue(&self, queue: Vec<QueuedEntry>) -> Self {
        QueueState {
            connected: self.connected,
            queue,
        }
    }

    pub fn entries(&self) -> &[QueuedEntry] {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Index of the first entry structurally equal to `entry`.
    pub fn position_of(&self, entry: &QueuedEntry) -> Option<usize> {
        self.queue.iter().position(|e| e == entry)
    }
}

impl Default for QueueState {
    fn default() -> Self {
        QueueState::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn initial_state_is_connected_and_empty() {
        let state = QueueState::initial();
        assert!(state.connected);
        assert!(state.is_empty());
        assert_eq!(state, QueueState::default());
    }

    #[test]
    fn with_connected_leaves_original_untouched() {
        let state = QueueState::initial().with_queue(vec![QueuedEntry::new("A", json!(1))]);
        let offline = state.with_connected(false);

        assert!(state.connected);
        assert!(!offline.connected);
        assert_eq!(offline.queue, state.queue);
    }

    #[test]
    fn position_of_uses_structural_equality() {
        let state = QueueState::initial().with_queue(vec![
            QueuedEntry::new("A", json!({"x": 1, "y": 2})),
            QueuedEntry::new("B", json!(null)),
        ]);

        let lookup = QueuedEntry::new("A", json!({"y": 2, "x": 1}));
        assert_eq!(state.position_of(&lookup), Some(0));
        assert_eq!(state.position_of(&QueuedEntry::new("C", json!(null))), None);
    }
}
