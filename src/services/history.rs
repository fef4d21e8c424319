//! Bounded call history
//!
//! Keeps the most recent upstream call records in memory. Writers append,
//! readers take newest-first snapshots. Nothing is persisted.

use crate::models::CallRecord;
use std::collections::VecDeque;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Capacity used when none is configured
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Fixed-capacity, insertion-ordered store of call records
#[derive(Debug)]
pub struct CallHistory {
    capacity: usize,
    records: RwLock<VecDeque<CallRecord>>,
}

impl CallHistory {
    /// Create an empty history holding at most `capacity` records
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Append a record, evicting the oldest ones beyond capacity
    pub fn append(&self, record: CallRecord) {
        let mut records = self.write();
        records.push_back(record);
        while records.len() > self.capacity {
            records.pop_front();
        }
    }

    /// Independent copy of the held records, newest first
    pub fn snapshot(&self) -> Vec<CallRecord> {
        self.read().iter().rev().cloned().collect()
    }

    // A panic while holding the lock cannot leave a half-written record behind:
    // push/pop either happened or did not. Recover the guard instead of failing.
    fn read(&self) -> RwLockReadGuard<'_, VecDeque<CallRecord>> {
        self.records.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, VecDeque<CallRecord>> {
        self.records.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for CallHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn record(n: usize) -> CallRecord {
        CallRecord::new("GET", format!("https://api.example.com/v2/products?n={}", n))
            .with_status(200)
            .with_duration(Duration::from_micros(n as u64))
    }

    #[test]
    fn test_empty_history() {
        let history = CallHistory::default();
        assert!(history.is_empty());
        assert_eq!(history.capacity(), DEFAULT_HISTORY_CAPACITY);
        assert!(history.snapshot().is_empty());
    }

    #[test]
    fn test_snapshot_is_newest_first() {
        let history = CallHistory::new(10);
        for n in 1..=5 {
            history.append(record(n));
        }

        let urls: Vec<String> = history.snapshot().into_iter().map(|r| r.url).collect();
        let expected: Vec<String> = (1..=5).rev().map(|n| record(n).url).collect();
        assert_eq!(urls, expected);
    }

    #[test]
    fn test_evicts_oldest_beyond_capacity() {
        let history = CallHistory::new(100);
        for n in 1..=105 {
            history.append(record(n));
        }

        let snapshot = history.snapshot();
        assert_eq!(snapshot.len(), 100);
        assert_eq!(snapshot.first().unwrap().url, record(105).url);
        assert_eq!(snapshot.last().unwrap().url, record(6).url);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let history = CallHistory::new(0);
        history.append(record(1));
        history.append(record(2));
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.snapshot()[0].url, record(2).url);
    }

    #[test]
    fn test_snapshot_does_not_alias_storage() {
        let history = CallHistory::new(3);
        history.append(record(1));
        let before = history.snapshot();

        history.append(record(2));
        history.append(record(3));
        history.append(record(4));

        assert_eq!(before.len(), 1);
        assert_eq!(before[0].url, record(1).url);
    }

    #[test]
    fn test_repeated_snapshots_are_equal() {
        let history = CallHistory::new(5);
        for n in 1..=7 {
            history.append(record(n));
        }
        assert_eq!(history.snapshot(), history.snapshot());
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        let history = Arc::new(CallHistory::new(1000));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let history = Arc::clone(&history);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        history.append(record(t * 100 + i));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = history.snapshot();
        assert_eq!(snapshot.len(), 800);

        let mut urls: Vec<&str> = snapshot.iter().map(|r| r.url.as_str()).collect();
        urls.sort_unstable();
        urls.dedup();
        assert_eq!(urls.len(), 800);
    }
}
