//! Cache Entry Module
//!
//! Defines the memory tier's entry: a value and the instant it goes stale.

use chrono::{DateTime, Utc};

// == Cache Entry ==
/// A value held by the memory tier together with its expiration time.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Instant from which the entry must no longer be returned
    pub expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= expires_at`, so an
    /// entry is never served at the exact instant its TTL runs out.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
