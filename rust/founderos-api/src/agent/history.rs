//! Bounded FIFO log used for run history and insights.

use std::collections::VecDeque;

/// Fixed-capacity log that evicts its oldest entry on overflow.
///
/// Order is insertion order, so "oldest" means first pushed regardless of
/// any timestamp the entries carry.
#[derive(Debug, Clone)]
pub struct BoundedLog<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedLog<T> {
    /// Create an empty log holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, returning the entry evicted to make room.
    pub fn push(&mut self, entry: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(entry);
        }
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Append every entry, returning how many were evicted.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, entries: I) -> usize {
        entries
            .into_iter()
            .filter_map(|entry| self.push(entry))
            .count()
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Up to `limit` entries from newest to oldest.
    pub fn newest(&self, limit: usize) -> impl Iterator<Item = &T> {
        self.entries.iter().rev().take(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_within_capacity() {
        let mut log = BoundedLog::new(3);
        assert!(log.push(1).is_none());
        assert!(log.push(2).is_none());
        assert_eq!(log.len(), 2);
        assert_eq!(log.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut log = BoundedLog::new(3);
        for i in 0..3 {
            log.push(i);
        }
        assert_eq!(log.push(3), Some(0));
        assert_eq!(log.push(4), Some(1));
        assert_eq!(log.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(log.len(), log.capacity());
    }

    #[test]
    fn test_extend_counts_evictions() {
        let mut log = BoundedLog::new(50);
        let evicted = log.extend(0..120);
        assert_eq!(evicted, 70);
        assert_eq!(log.len(), 50);
        assert_eq!(log.iter().next(), Some(&70));
    }

    #[test]
    fn test_newest_is_reverse_insertion_order() {
        let mut log = BoundedLog::new(10);
        log.extend(["a", "b", "c", "d"]);
        let newest: Vec<_> = log.newest(2).copied().collect();
        assert_eq!(newest, vec!["d", "c"]);
        assert_eq!(log.newest(100).count(), 4);
    }

    #[test]
    fn test_zero_capacity_retains_nothing() {
        let mut log = BoundedLog::new(0);
        assert_eq!(log.push("x"), Some("x"));
        assert!(log.is_empty());
    }
}
