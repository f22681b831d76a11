//! Memory Tier Module
//!
//! A count-bounded map of key -> (value, expires_at). The tier never judges
//! expiry itself; the coordinator does, because only it knows whether to fall
//! back to disk.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Utc};

use crate::cache::{CacheEntry, LruTracker};

// == Bounded Map ==
/// A map holding at most `capacity()` entries.
///
/// Which entry is dropped when a new key would exceed the bound is up to the
/// implementation. Dropping an entry that is never read again is normal
/// operation, not an error.
pub trait BoundedMap<K, V>: Send {
    /// Inserts or replaces `key`, returning a key evicted to make room.
    fn insert(&mut self, key: K, value: V) -> Option<K>;

    /// Looks up `key`, counting as a use for eviction purposes.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Looks up `key` without affecting eviction order.
    fn peek(&self, key: &K) -> Option<&V>;

    fn keys(&self) -> Vec<K>;

    fn remove(&mut self, key: &K) -> Option<V>;

    fn clear(&mut self);

    fn len(&self) -> usize;

    fn capacity(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// == LRU Map ==
/// HashMap storage with LRU eviction.
#[derive(Debug)]
pub struct LruMap<K, V> {
    entries: HashMap<K, V>,
    lru: LruTracker<K>,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V> LruMap<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            capacity,
        }
    }
}

impl<K, V> BoundedMap<K, V> for LruMap<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
    fn insert(&mut self, key: K, value: V) -> Option<K> {
        if self.capacity == 0 {
            return None;
        }

        let mut evicted = None;
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            if let Some(oldest) = self.lru.evict_oldest() {
                self.entries.remove(&oldest);
                evicted = Some(oldest);
            }
        }

        self.lru.touch(&key);
        self.entries.insert(key, value);
        evicted
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        let value = self.entries.get(key)?;
        self.lru.touch(key);
        Some(value)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    fn keys(&self) -> Vec<K> {
        self.entries.keys().cloned().collect()
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.lru.remove(key);
        self.entries.remove(key)
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

// == Memory Tier ==
/// The fast tier: entries with their expiration times, no I/O.
pub struct MemoryTier<K, V> {
    map: Box<dyn BoundedMap<K, CacheEntry<V>>>,
}

impl<K, V> MemoryTier<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    /// Creates a tier backed by an [`LruMap`] of the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self::with_map(Box::new(LruMap::new(capacity)))
    }

    pub fn with_map(map: Box<dyn BoundedMap<K, CacheEntry<V>>>) -> Self {
        Self { map }
    }

    /// Inserts or replaces `key`. Returns the key evicted for capacity, if any.
    pub fn put(&mut self, key: K, value: V, expires_at: DateTime<Utc>) -> Option<K> {
        self.map.insert(key, CacheEntry { value, expires_at })
    }

    /// Returns the stored entry, expired or not.
    pub fn get(&mut self, key: &K) -> Option<(V, DateTime<Utc>)> {
        self.map
            .get(key)
            .map(|entry| (entry.value.clone(), entry.expires_at))
    }

    pub fn remove(&mut self, key: &K) -> bool {
        self.map.remove(key).is_some()
    }

    pub fn remove_all(&mut self) {
        self.map.clear();
    }

    /// Removes every entry expired at `now`, returning how many were dropped.
    pub fn remove_expired(&mut self, now: DateTime<Utc>) -> usize {
        let expired: Vec<K> = self
            .map
            .keys()
            .into_iter()
            .filter(|key| {
                self.map
                    .peek(key)
                    .map(|entry| entry.is_expired_at(now))
                    .unwrap_or(false)
            })
            .collect();

        for key in &expired {
            self.map.remove(key);
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn tier(capacity: usize) -> MemoryTier<String, u32> {
        MemoryTier::new(capacity)
    }

    fn k(s: &str) -> String {
        s.to_string()
    }

    #[test]
    fn test_put_and_get() {
        let mut memory = tier(10);
        let expires = Utc::now() + Duration::seconds(60);

        assert_eq!(memory.put(k("a"), 1, expires), None);

        assert_eq!(memory.get(&k("a")), Some((1, expires)));
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_get_returns_expired_entries() {
        let mut memory = tier(10);
        let expired = Utc::now() - Duration::seconds(1);

        memory.put(k("a"), 1, expired);

        // Expiry is judged by the coordinator, not the tier
        assert_eq!(memory.get(&k("a")), Some((1, expired)));
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let mut memory = tier(2);
        let expires = Utc::now() + Duration::seconds(60);

        memory.put(k("a"), 1, expires);
        memory.put(k("b"), 2, expires);
        assert_eq!(memory.put(k("a"), 3, expires), None);

        assert_eq!(memory.len(), 2);
        assert_eq!(memory.get(&k("a")).map(|(v, _)| v), Some(3));
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let mut memory = tier(2);
        let expires = Utc::now() + Duration::seconds(60);

        memory.put(k("a"), 1, expires);
        memory.put(k("b"), 2, expires);
        // Reading "a" makes "b" the eviction candidate
        memory.get(&k("a"));

        assert_eq!(memory.put(k("c"), 3, expires), Some(k("b")));
        assert_eq!(memory.len(), 2);
        assert!(memory.get(&k("b")).is_none());
        assert!(memory.get(&k("a")).is_some());
        assert!(memory.get(&k("c")).is_some());
    }

    #[test]
    fn test_peek_does_not_refresh_recency() {
        let mut map: LruMap<String, u32> = LruMap::new(2);
        map.insert(k("a"), 1);
        map.insert(k("b"), 2);

        assert_eq!(map.peek(&k("a")), Some(&1));

        // "a" is still the oldest
        assert_eq!(map.insert(k("c"), 3), Some(k("a")));
    }

    #[test]
    fn test_zero_capacity_holds_nothing() {
        let mut memory = tier(0);

        memory.put(k("a"), 1, Utc::now() + Duration::seconds(60));

        assert!(memory.is_empty());
        assert!(memory.get(&k("a")).is_none());
        assert_eq!(memory.capacity(), 0);
    }

    #[test]
    fn test_remove_and_remove_all() {
        let mut memory = tier(10);
        let expires = Utc::now() + Duration::seconds(60);
        memory.put(k("a"), 1, expires);
        memory.put(k("b"), 2, expires);

        assert!(memory.remove(&k("a")));
        assert!(!memory.remove(&k("a")));
        assert_eq!(memory.len(), 1);

        memory.remove_all();
        assert!(memory.is_empty());
    }

    #[test]
    fn test_remove_expired_only_drops_stale_entries() {
        let mut memory = tier(10);
        let now = Utc::now();
        memory.put(k("stale"), 1, now - Duration::seconds(1));
        memory.put(k("fresh"), 2, now + Duration::seconds(60));

        let removed = memory.remove_expired(now);

        assert_eq!(removed, 1);
        assert!(memory.get(&k("stale")).is_none());
        assert!(memory.get(&k("fresh")).is_some());
    }
}
