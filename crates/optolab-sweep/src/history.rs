use std::collections::VecDeque;

/// Number of recently issued indices kept for rewinding after a pause.
pub const DEFAULT_HISTORY_DEPTH: usize = 5;

/// Bounded record of the most recently issued sweep indices.
///
/// When full, pushing evicts the oldest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapHistory {
    entries: VecDeque<i64>,
    capacity: usize,
}

impl OverlapHistory {
    /// History holding at most `capacity` indices (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, index: i64) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(index);
    }

    /// Oldest index still held.
    pub fn oldest(&self) -> Option<i64> {
        self.entries.front().copied()
    }

    /// Most recently pushed index.
    pub fn newest(&self) -> Option<i64> {
        self.entries.back().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Indices from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.iter().copied()
    }
}

impl Default for OverlapHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}
