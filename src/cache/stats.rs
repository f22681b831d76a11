//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// A point-in-time snapshot of cache metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Namespace of the cache these numbers belong to
    pub namespace: String,
    /// Successful lookups, from either tier
    pub hits: u64,
    /// Lookups that found nothing usable
    pub misses: u64,
    /// Hits answered by the memory tier
    pub memory_hits: u64,
    /// Hits answered by the disk tier and promoted to memory
    pub disk_hits: u64,
    /// Calls to `set`, including batch and warm-up writes
    pub writes: u64,
    /// Writes that stayed memory-only because the value could not be encoded
    /// or the disk write failed
    pub disk_writes_skipped: u64,
    /// Entries dropped from memory to honor the count limit
    pub memory_evictions: u64,
    /// Files deleted to honor the disk quota
    pub disk_evictions: u64,
    /// Entries discarded because their TTL had elapsed
    pub expirations: u64,
    /// Entries currently held in memory
    pub memory_entries: usize,
    /// Bytes stored by the disk tier; None unless the snapshot measured it
    pub disk_bytes: Option<u64>,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Stats Recorder ==
/// Lock-free counters shared by concurrent cache operations.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    memory_hits: AtomicU64,
    disk_hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    disk_writes_skipped: AtomicU64,
    memory_evictions: AtomicU64,
    disk_evictions: AtomicU64,
    expirations: AtomicU64,
}

impl StatsRecorder {
    pub fn record_memory_hit(&self) {
        self.memory_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_disk_hit(&self) {
        self.disk_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_disk_write_skipped(&self) {
        self.disk_writes_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_memory_eviction(&self) {
        self.memory_evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_disk_evictions(&self, count: usize) {
        self.disk_evictions.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_expirations(&self, count: usize) {
        self.expirations.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        for counter in [
            &self.memory_hits,
            &self.disk_hits,
            &self.misses,
            &self.writes,
            &self.disk_writes_skipped,
            &self.memory_evictions,
            &self.disk_evictions,
            &self.expirations,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Builds a snapshot; `memory_entries` comes from the memory tier.
    pub fn snapshot(&self, namespace: &str, memory_entries: usize) -> CacheStats {
        let memory_hits = self.memory_hits.load(Ordering::Relaxed);
        let disk_hits = self.disk_hits.load(Ordering::Relaxed);
        CacheStats {
            namespace: namespace.to_string(),
            hits: memory_hits + disk_hits,
            misses: self.misses.load(Ordering::Relaxed),
            memory_hits,
            disk_hits,
            writes: self.writes.load(Ordering::Relaxed),
            disk_writes_skipped: self.disk_writes_skipped.load(Ordering::Relaxed),
            memory_evictions: self.memory_evictions.load(Ordering::Relaxed),
            disk_evictions: self.disk_evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            memory_entries,
            disk_bytes: None,
        }
    }
}
