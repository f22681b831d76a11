//! Access Tracking Module
//!
//! Per-key read and write counters, used to report the hottest keys.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Patterns untouched for this long are dropped by maintenance
pub const ACCESS_RETENTION: Duration = Duration::from_secs(60 * 60);

/// How often, and how recently, a key was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPattern {
    /// Reads that found the key plus writes
    pub access_count: u64,
    pub write_count: u64,
    pub last_accessed: DateTime<Utc>,
}

// == Access Tracker ==
#[derive(Debug)]
pub(crate) struct AccessTracker<K> {
    patterns: HashMap<K, AccessPattern>,
}

impl<K> Default for AccessTracker<K> {
    fn default() -> Self {
        Self {
            patterns: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> AccessTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a successful read of `key`.
    pub fn record_read(&mut self, key: &K, now: DateTime<Utc>) {
        self.record(key, now, false);
    }

    /// Counts a write of `key`; writes are accesses too.
    pub fn record_write(&mut self, key: &K, now: DateTime<Utc>) {
        self.record(key, now, true);
    }

    fn record(&mut self, key: &K, now: DateTime<Utc>, is_write: bool) {
        let pattern = self.patterns.entry(key.clone()).or_insert(AccessPattern {
            access_count: 0,
            write_count: 0,
            last_accessed: now,
        });
        pattern.access_count += 1;
        pattern.last_accessed = now;
        if is_write {
            pattern.write_count += 1;
        }
    }

    pub fn get(&self, key: &K) -> Option<&AccessPattern> {
        self.patterns.get(key)
    }

    pub fn remove(&mut self, key: &K) {
        self.patterns.remove(key);
    }

    pub fn clear(&mut self) {
        self.patterns.clear();
    }

    // == Hot Keys ==
    /// Returns up to `limit` keys with their access counts, most used first.
    ///
    /// Equal counts are ordered by most recent access.
    pub fn hot_keys(&self, limit: usize) -> Vec<(K, u64)> {
        let mut ranked: Vec<(&K, &AccessPattern)> = self.patterns.iter().collect();
        ranked.sort_by(|(_, a), (_, b)| {
            b.access_count
                .cmp(&a.access_count)
                .then_with(|| b.last_accessed.cmp(&a.last_accessed))
        });
        ranked
            .into_iter()
            .take(limit)
            .map(|(key, pattern)| (key.clone(), pattern.access_count))
            .collect()
    }

    /// Drops patterns not accessed since `cutoff`, returning how many went.
    pub fn prune_idle(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.patterns.len();
        self.patterns.retain(|_, pattern| pattern.last_accessed > cutoff);
        before - self.patterns.len()
    }
}
