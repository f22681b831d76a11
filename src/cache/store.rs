//! Cache Store Module
//!
//! The public cache: a memory tier in front of a disk tier, both bounded by the
//! same TTL.
//!
//! # Concurrency
//! The disk tier sits behind a read-write lock that is the single coordination
//! point for the whole cache:
//! - `get` runs under the shared guard, including disk reads and promotion
//!   into memory, so a promotion can never resurrect a value that a concurrent
//!   `set` or `remove` has replaced.
//! - `set`, `remove`, `remove_all`, `prune_expired` and the lazy deletion of an
//!   expired file found by `get` take the exclusive guard.
//!
//! The memory tier has its own short-lived mutex, never held across an await.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::access::{AccessPattern, AccessTracker, ACCESS_RETENTION};
use crate::cache::codec::{BytesCodec, Codec, JsonCodec};
use crate::cache::disk::{DiskRead, DiskTier};
use crate::cache::key::CacheKey;
use crate::cache::memory::MemoryTier;
use crate::cache::stats::{CacheStats, StatsRecorder};
use crate::clock::{expires_after, Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::Result;

/// A cache of raw byte payloads.
pub type BytesCache<K> = TieredCache<K, Vec<u8>, BytesCodec>;

/// A cache of serde values stored on disk as JSON.
pub type JsonCache<K, V> = TieredCache<K, V, JsonCodec<V>>;

// == Tiered Cache ==
/// Memory + disk cache with TTL expiry, a memory count limit and a disk quota.
///
/// Storage failures never surface from its operations: they are logged and
/// show up as misses.
pub struct TieredCache<K, V, C = JsonCodec<V>> {
    config: CacheConfig,
    memory: Mutex<MemoryTier<K, V>>,
    disk: RwLock<DiskTier>,
    codec: C,
    clock: Arc<dyn Clock>,
    stats: StatsRecorder,
    access: Mutex<AccessTracker<K>>,
}

impl<K, V, C> TieredCache<K, V, C>
where
    K: CacheKey,
    V: Clone + Send + Sync + 'static,
    C: Codec<V>,
{
    // == Constructor ==
    /// Creates a cache using the system clock.
    ///
    /// Fails only if the configuration is invalid or the cache directory
    /// cannot be created.
    pub async fn new(config: CacheConfig, codec: C) -> Result<Self> {
        Self::with_clock(config, codec, Arc::new(SystemClock)).await
    }

    /// Creates a cache with the codec's default instance.
    pub async fn open(config: CacheConfig) -> Result<Self>
    where
        C: Default,
    {
        Self::new(config, C::default()).await
    }

    /// Creates a cache reading time from `clock`.
    pub async fn with_clock(config: CacheConfig, codec: C, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let disk = DiskTier::open(
            config.cache_dir(),
            config.max_disk_bytes,
            config.ttl,
            clock.clone(),
        )
        .await?;

        // Startup sweep of whatever a previous process left behind
        let pruned = disk.prune_expired().await;

        info!(
            "Initialized cache '{}' with memory:{} disk:{} ttl:{}s (pruned {} expired files)",
            config.namespace,
            config.max_memory_count,
            config.max_disk_bytes,
            config.ttl.as_secs(),
            pruned
        );

        Ok(Self {
            memory: Mutex::new(MemoryTier::new(config.max_memory_count)),
            disk: RwLock::new(disk),
            config,
            codec,
            clock,
            stats: StatsRecorder::default(),
            access: Mutex::new(AccessTracker::new()),
        })
    }

    // == Set ==
    /// Stores `value` in both tiers, returning once both writes are done.
    ///
    /// If the value cannot be encoded it is kept in memory only, and any older
    /// file for the key is deleted so it cannot be promoted later.
    pub async fn set(&self, key: K, value: V) {
        // Encode before taking the lock; the disk only ever sees complete bytes.
        let encoded = self.codec.encode(&value);

        let disk = self.disk.write().await;
        let now = self.clock.now();
        let expires_at = expires_after(now, self.config.ttl);
        self.access.lock().record_write(&key, now);

        let evicted = self.memory.lock().put(key.clone(), value, expires_at);
        if let Some(evicted) = evicted {
            self.stats.record_memory_eviction();
            debug!(key = ?evicted, "Evicted from memory tier");
        }

        let persisted = match encoded {
            Some(bytes) => {
                let outcome = disk.write(&key, &bytes).await;
                self.stats.record_disk_evictions(outcome.evicted);
                outcome.written
            }
            None => false,
        };

        if !persisted {
            self.stats.record_disk_write_skipped();
            disk.remove(&key).await;
            debug!(key = ?key, "Cached value in memory only");
        }

        self.stats.record_write();
    }

    // == Get ==
    /// Returns the value for `key` if it is present and fresh in either tier.
    ///
    /// A disk hit is promoted into memory with a fresh expiration.
    pub async fn get(&self, key: &K) -> Option<V> {
        let disk = self.disk.read().await;
        let now = self.clock.now();

        let (cached, expired) = {
            let mut memory = self.memory.lock();
            match memory.get(key) {
                Some((value, expires_at)) if now < expires_at => (Some(value), false),
                Some(_) => (None, memory.remove(key)),
                None => (None, false),
            }
        };

        if let Some(value) = cached {
            self.access.lock().record_read(key, now);
            self.stats.record_memory_hit();
            return Some(value);
        }
        if expired {
            self.stats.record_expirations(1);
            debug!(key = ?key, "Memory entry expired");
        }

        match disk.read(key).await {
            DiskRead::Hit(bytes) => {
                let Some(value) = self.codec.decode(&bytes) else {
                    self.stats.record_miss();
                    return None;
                };

                let now = self.clock.now();
                let evicted = self.memory.lock().put(
                    key.clone(),
                    value.clone(),
                    expires_after(now, self.config.ttl),
                );
                if evicted.is_some() {
                    self.stats.record_memory_eviction();
                }
                self.access.lock().record_read(key, now);

                self.stats.record_disk_hit();
                debug!(key = ?key, "Promoted disk entry to memory");
                Some(value)
            }
            DiskRead::Expired => {
                drop(disk);
                // Deleting is a mutation: upgrade to the exclusive guard, then
                // re-check, since a writer may have refreshed the file meanwhile.
                let disk = self.disk.write().await;
                if disk.remove_if_expired(key).await {
                    self.stats.record_expirations(1);
                }
                self.stats.record_miss();
                None
            }
            DiskRead::Miss => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Contains ==
    /// Same as `get(key).is_some()`, including expiry and promotion, so it
    /// never claims an entry that `get` would refuse to return.
    pub async fn contains(&self, key: &K) -> bool {
        self.get(key).await.is_some()
    }

    // == Remove ==
    /// Removes `key` from both tiers. Removing an absent key is a no-op.
    pub async fn remove(&self, key: &K) {
        let disk = self.disk.write().await;
        self.memory.lock().remove(key);
        self.access.lock().remove(key);
        disk.remove(key).await;
        debug!(key = ?key, "Removed cache entry");
    }

    /// Clears both tiers and resets statistics and access counts.
    pub async fn remove_all(&self) {
        let disk = self.disk.write().await;
        self.memory.lock().remove_all();
        self.access.lock().clear();
        disk.remove_all().await;
        self.stats.reset();
        info!("Cleared all cache entries for '{}'", self.config.namespace);
    }

    // == Batch Operations ==
    /// Stores every item in order.
    pub async fn set_many<I>(&self, items: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut count = 0usize;
        for (key, value) in items {
            self.set(key, value).await;
            count += 1;
        }
        debug!("Batch cached {} items", count);
    }

    /// Looks up every key, returning only the hits.
    pub async fn get_many<'a, I>(&self, keys: I) -> HashMap<K, V>
    where
        I: IntoIterator<Item = &'a K>,
    {
        let mut results = HashMap::new();
        let mut requested = 0usize;
        for key in keys {
            requested += 1;
            if let Some(value) = self.get(key).await {
                results.insert(key.clone(), value);
            }
        }
        debug!("Batch retrieved {}/{} items", results.len(), requested);
        results
    }

    // == Warm Up ==
    /// Loads and caches every key that is not already cached.
    ///
    /// Returns how many keys were loaded. Keys for which `loader` returns None
    /// are left absent.
    pub async fn warm_up<I, F, Fut>(&self, keys: I, mut loader: F) -> usize
    where
        I: IntoIterator<Item = K>,
        F: FnMut(K) -> Fut,
        Fut: Future<Output = Option<V>>,
    {
        let mut loaded = 0;
        for key in keys {
            if self.contains(&key).await {
                continue;
            }
            if let Some(value) = loader(key.clone()).await {
                self.set(key, value).await;
                loaded += 1;
            }
        }
        info!("Warmed up cache '{}' with {} keys", self.config.namespace, loaded);
        loaded
    }

    /// Returns the cached value, or loads, caches and returns it.
    ///
    /// The loader runs outside the cache lock: two callers missing at the same
    /// time may both load, and the last `set` wins.
    pub async fn get_or_insert_with<F, Fut>(&self, key: K, loader: F) -> Option<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<V>>,
    {
        if let Some(value) = self.get(&key).await {
            return Some(value);
        }
        let value = loader().await?;
        self.set(key, value.clone()).await;
        Some(value)
    }

    // == Maintenance ==
    /// Drops expired entries from both tiers, returning how many went.
    ///
    /// Access counts of keys idle for longer than [`ACCESS_RETENTION`] are
    /// dropped too.
    pub async fn prune_expired(&self) -> usize {
        let disk = self.disk.write().await;
        let now = self.clock.now();
        let from_memory = self.memory.lock().remove_expired(now);
        let from_disk = disk.prune_expired().await;

        let cutoff = chrono::Duration::from_std(ACCESS_RETENTION)
            .ok()
            .and_then(|retention| now.checked_sub_signed(retention))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let idle = self.access.lock().prune_idle(cutoff);
        if idle > 0 {
            debug!("Dropped access counts for {} idle keys", idle);
        }

        let removed = from_memory + from_disk;
        self.stats.record_expirations(removed);
        removed
    }

    /// Drops the memory copy of `key` only, as under memory pressure. The disk
    /// copy stays and is promoted again by the next `get`.
    pub async fn evict_from_memory(&self, key: &K) -> bool {
        let _disk = self.disk.write().await;
        self.memory.lock().remove(key)
    }

    /// Drops every memory copy, keeping the disk tier intact.
    pub async fn clear_memory(&self) {
        let _disk = self.disk.write().await;
        self.memory.lock().remove_all();
        debug!("Cleared memory tier for '{}'", self.config.namespace);
    }

    // == Diagnostics ==
    /// Total bytes currently stored by the disk tier.
    pub async fn disk_usage(&self) -> u64 {
        self.disk.read().await.total_bytes().await
    }

    /// Maximum number of entries the memory tier holds.
    pub fn memory_capacity(&self) -> usize {
        self.memory.lock().capacity()
    }

    /// Entries currently held in memory, expired ones included.
    pub fn memory_len(&self) -> usize {
        self.memory.lock().len()
    }

    /// Counters and memory occupancy. Leaves `disk_bytes` unset so it never
    /// touches the disk.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(&self.config.namespace, self.memory_len())
    }

    /// Same as [`TieredCache::stats`], with `disk_bytes` measured.
    pub async fn stats_with_usage(&self) -> CacheStats {
        let disk_bytes = self.disk_usage().await;
        CacheStats {
            disk_bytes: Some(disk_bytes),
            ..self.stats()
        }
    }

    // == Hot Keys ==
    /// Returns up to `limit` keys with their access counts, most used first.
    ///
    /// Writes and successful reads both count. Counts for a key go away when
    /// it is removed.
    pub fn hot_keys(&self, limit: usize) -> Vec<(K, u64)> {
        self.access.lock().hot_keys(limit)
    }

    pub fn access_pattern(&self, key: &K) -> Option<AccessPattern> {
        self.access.lock().get(key).copied()
    }

    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    pub fn maintenance_interval(&self) -> Duration {
        self.config.maintenance_interval
    }

    pub async fn cache_dir(&self) -> PathBuf {
        self.disk.read().await.dir().to_path_buf()
    }

    /// File the disk tier uses for `key`.
    pub async fn disk_path_for(&self, key: &K) -> PathBuf {
        self.disk.read().await.path_for(key)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::codec::MemoryOnlyCodec;
    use crate::clock::ManualClock;
    use chrono::TimeZone;
    use tempfile::{tempdir, TempDir};

    const TTL: Duration = Duration::from_secs(60);

    async fn open_cache(memory: usize, disk: u64) -> (TempDir, ManualClock, BytesCache<String>) {
        let dir = tempdir().unwrap();
        let clock = ManualClock::starting_at(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        let config = CacheConfig::new("store")
            .with_root_dir(dir.path())
            .with_max_memory_count(memory)
            .with_max_disk_bytes(disk)
            .with_ttl(TTL);
        let cache = TieredCache::with_clock(config, BytesCodec, Arc::new(clock.clone()))
            .await
            .unwrap();
        (dir, clock, cache)
    }

    fn k(s: &str) -> String {
        s.to_string()
    }

    #[tokio::test]
    async fn test_store_set_and_get() {
        let (_dir, _clock, cache) = open_cache(10, 1024).await;

        cache.set(k("key1"), b"value1".to_vec()).await;

        assert_eq!(cache.get(&k("key1")).await, Some(b"value1".to_vec()));
        assert_eq!(cache.memory_len(), 1);
        assert!(cache.disk_path_for(&k("key1")).await.exists());
    }

    #[tokio::test]
    async fn test_store_get_nonexistent() {
        let (_dir, _clock, cache) = open_cache(10, 1024).await;

        assert_eq!(cache.get(&k("nonexistent")).await, None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_store_overwrite() {
        let (_dir, _clock, cache) = open_cache(10, 1024).await;

        cache.set(k("key1"), b"value1".to_vec()).await;
        cache.set(k("key1"), b"value2".to_vec()).await;
        cache.clear_memory().await;

        assert_eq!(cache.get(&k("key1")).await, Some(b"value2".to_vec()));
    }

    #[tokio::test]
    async fn test_store_entry_expires_at_exact_ttl() {
        let (_dir, clock, cache) = open_cache(10, 1024).await;
        cache.set(k("key1"), b"v".to_vec()).await;

        clock.advance(TTL);

        // Both tiers go stale at the same instant: no promotion at the boundary
        assert_eq!(cache.get(&k("key1")).await, None);
        assert_eq!(cache.stats().disk_hits, 0);
        assert_eq!(cache.stats().expirations, 2);
        assert!(!cache.disk_path_for(&k("key1")).await.exists());

        clock.advance(TTL - Duration::from_secs(1));
        assert_eq!(cache.get(&k("key1")).await, None);
        assert_eq!(cache.memory_len(), 0);
    }

    #[tokio::test]
    async fn test_store_ttl_expiration() {
        let (_dir, clock, cache) = open_cache(10, 1024).await;
        cache.set(k("key1"), b"v".to_vec()).await;

        clock.advance(TTL + Duration::from_millis(1));

        assert_eq!(cache.get(&k("key1")).await, None);
        assert_eq!(cache.memory_len(), 0);
        assert!(!cache.disk_path_for(&k("key1")).await.exists());
    }

    #[tokio::test]
    async fn test_store_promotion_refreshes_memory_expiry() {
        let (_dir, clock, cache) = open_cache(10, 1024).await;
        cache.set(k("key1"), b"v".to_vec()).await;
        cache.evict_from_memory(&k("key1")).await;

        clock.advance(Duration::from_secs(30));
        assert!(cache.get(&k("key1")).await.is_some());

        // Disk copy is now stale, but the promoted memory copy lives until 90s
        clock.advance(Duration::from_secs(45));
        assert_eq!(cache.get(&k("key1")).await, Some(b"v".to_vec()));
        assert_eq!(cache.stats().memory_hits, 1);
    }

    #[tokio::test]
    async fn test_store_memory_only_codec_skips_disk() {
        let dir = tempdir().unwrap();
        let config = CacheConfig::new("memonly").with_root_dir(dir.path());
        let cache: TieredCache<String, String, MemoryOnlyCodec> =
            TieredCache::new(config, MemoryOnlyCodec).await.unwrap();

        cache.set(k("a"), "alpha".to_string()).await;

        assert_eq!(cache.get(&k("a")).await, Some("alpha".to_string()));
        assert_eq!(cache.disk_usage().await, 0);
        assert_eq!(cache.stats().disk_writes_skipped, 1);

        cache.clear_memory().await;
        assert_eq!(cache.get(&k("a")).await, None);
    }

    #[tokio::test]
    async fn test_store_unencodable_value_drops_stale_disk_copy() {
        use std::collections::BTreeMap;

        let dir = tempdir().unwrap();
        let config = CacheConfig::new("json").with_root_dir(dir.path());
        let cache: JsonCache<String, BTreeMap<Vec<u8>, u8>> = TieredCache::open(config).await.unwrap();

        cache.set(k("a"), BTreeMap::new()).await;
        assert!(cache.disk_usage().await > 0);

        // Non-string map keys cannot be written as JSON
        let mut unencodable = BTreeMap::new();
        unencodable.insert(vec![1u8], 1u8);
        cache.set(k("a"), unencodable.clone()).await;

        assert_eq!(cache.disk_usage().await, 0);
        assert_eq!(cache.get(&k("a")).await, Some(unencodable));
    }

    #[tokio::test]
    async fn test_store_undecodable_file_is_a_miss() {
        let dir = tempdir().unwrap();
        let config = CacheConfig::new("json").with_root_dir(dir.path());
        let cache: JsonCache<String, u32> = TieredCache::open(config).await.unwrap();

        cache.set(k("a"), 5).await;
        std::fs::write(cache.disk_path_for(&k("a")).await, b"not json").unwrap();
        cache.clear_memory().await;

        assert_eq!(cache.get(&k("a")).await, None);
    }

    #[tokio::test]
    async fn test_store_remove_and_remove_all() {
        let (_dir, _clock, cache) = open_cache(10, 1024).await;
        cache.set(k("a"), b"1".to_vec()).await;
        cache.set(k("b"), b"2".to_vec()).await;

        cache.remove(&k("a")).await;
        cache.remove(&k("a")).await;
        assert_eq!(cache.get(&k("a")).await, None);
        assert!(cache.contains(&k("b")).await);

        cache.remove_all().await;
        assert!(!cache.contains(&k("b")).await);
        assert_eq!(cache.disk_usage().await, 0);
        assert_eq!(cache.memory_len(), 0);
    }

    #[tokio::test]
    async fn test_store_memory_capacity_eviction_is_counted() {
        let (_dir, _clock, cache) = open_cache(2, 1024).await;

        cache.set(k("a"), b"1".to_vec()).await;
        cache.set(k("b"), b"2".to_vec()).await;
        cache.set(k("c"), b"3".to_vec()).await;

        assert_eq!(cache.memory_len(), 2);
        assert_eq!(cache.memory_capacity(), 2);
        assert_eq!(cache.stats().memory_evictions, 1);
    }

    #[tokio::test]
    async fn test_store_disk_quota_eviction_is_counted() {
        let (_dir, clock, cache) = open_cache(10, 100).await;

        for key in ["a", "b", "c"] {
            cache.set(k(key), vec![0u8; 40]).await;
            clock.advance(Duration::from_secs(1));
        }

        assert_eq!(cache.disk_usage().await, 80);
        assert_eq!(cache.stats().disk_evictions, 1);
    }

    #[tokio::test]
    async fn test_store_prune_expired() {
        let (_dir, clock, cache) = open_cache(10, 1024).await;
        cache.set(k("old"), b"1".to_vec()).await;
        clock.advance(Duration::from_secs(50));
        cache.set(k("new"), b"2".to_vec()).await;
        clock.advance(Duration::from_secs(20));

        // "old": memory copy + disk file
        assert_eq!(cache.prune_expired().await, 2);
        assert_eq!(cache.memory_len(), 1);
        assert!(cache.contains(&k("new")).await);
    }

    #[tokio::test]
    async fn test_store_get_or_insert_with() {
        let (_dir, _clock, cache) = open_cache(10, 1024).await;

        let loaded = cache
            .get_or_insert_with(k("a"), || async { Some(b"loaded".to_vec()) })
            .await;
        assert_eq!(loaded, Some(b"loaded".to_vec()));

        // Second call is served from the cache
        let again = cache
            .get_or_insert_with(k("a"), || async { Some(b"other".to_vec()) })
            .await;
        assert_eq!(again, Some(b"loaded".to_vec()));

        let missing = cache.get_or_insert_with(k("b"), || async { None }).await;
        assert_eq!(missing, None);
        assert!(!cache.contains(&k("b")).await);
    }

    #[tokio::test]
    async fn test_store_hot_keys_count_reads_and_writes() {
        let (_dir, _clock, cache) = open_cache(1, 1024).await;

        cache.set(k("hot"), b"1".to_vec()).await;
        cache.set(k("warm"), b"2".to_vec()).await;
        cache.set(k("cold"), b"3".to_vec()).await;
        for _ in 0..3 {
            // Capacity 1: some of these are disk hits, all count
            cache.get(&k("hot")).await;
        }
        cache.get(&k("warm")).await;
        cache.get(&k("missing")).await;

        assert_eq!(cache.hot_keys(2), vec![(k("hot"), 4), (k("warm"), 2)]);
        let pattern = cache.access_pattern(&k("hot")).unwrap();
        assert_eq!(pattern.write_count, 1);
        assert!(cache.access_pattern(&k("missing")).is_none());
    }

    #[tokio::test]
    async fn test_store_remove_clears_access_counts() {
        let (_dir, _clock, cache) = open_cache(10, 1024).await;
        cache.set(k("a"), b"1".to_vec()).await;
        cache.set(k("b"), b"2".to_vec()).await;
        cache.get(&k("a")).await;

        cache.remove(&k("a")).await;
        assert_eq!(cache.hot_keys(10), vec![(k("b"), 1)]);

        cache.remove_all().await;
        assert!(cache.hot_keys(10).is_empty());
    }

    #[tokio::test]
    async fn test_store_prune_drops_idle_access_counts() {
        let (_dir, clock, cache) = open_cache(10, 1024).await;
        cache.set(k("a"), b"1".to_vec()).await;

        clock.advance(crate::cache::ACCESS_RETENTION + Duration::from_secs(1));
        cache.prune_expired().await;

        assert!(cache.hot_keys(10).is_empty());
    }

    #[tokio::test]
    async fn test_store_stats_report_namespace_and_usage() {
        let (_dir, _clock, cache) = open_cache(10, 1024).await;
        cache.set(k("a"), vec![0u8; 30]).await;
        cache.set(k("b"), vec![0u8; 12]).await;

        let quick = cache.stats();
        assert_eq!(quick.namespace, "store");
        assert_eq!(quick.disk_bytes, None);

        let full = cache.stats_with_usage().await;
        assert_eq!(full.namespace, "store");
        assert_eq!(full.disk_bytes, Some(42));
        assert_eq!(full.writes, 2);
        assert_eq!(full.memory_entries, 2);
    }

    #[tokio::test]
    async fn test_store_rejects_invalid_config() {
        let dir = tempdir().unwrap();
        let config = CacheConfig::new("bad")
            .with_root_dir(dir.path())
            .with_ttl(Duration::ZERO);

        let result = BytesCache::<String>::open(config).await;
        assert!(matches!(
            result,
            Err(crate::error::CacheError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_store_startup_prunes_expired_files() {
        let dir = tempdir().unwrap();
        let clock = ManualClock::starting_at(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        let config = CacheConfig::new("restart")
            .with_root_dir(dir.path())
            .with_ttl(TTL);

        let first: BytesCache<String> =
            TieredCache::with_clock(config.clone(), BytesCodec, Arc::new(clock.clone()))
                .await
                .unwrap();
        first.set(k("a"), b"1".to_vec()).await;
        let path = first.disk_path_for(&k("a")).await;
        drop(first);

        clock.advance(TTL + Duration::from_secs(1));
        let _second: BytesCache<String> =
            TieredCache::with_clock(config, BytesCodec, Arc::new(clock.clone()))
                .await
                .unwrap();

        assert!(!path.exists());
    }
}
