//! Cache Module
//!
//! Two-tier caching: a count-bounded LRU memory tier in front of a
//! quota-bounded disk tier, both expiring entries after the same TTL.

mod access;
pub mod codec;
pub mod disk;
mod entry;
pub mod key;
mod lru;
pub mod memory;
mod stats;
mod store;


// Re-export public types
pub use access::{AccessPattern, ACCESS_RETENTION};
pub use codec::{BytesCodec, Codec, JsonCodec, MemoryOnlyCodec};
pub use disk::{DiskRead, DiskTier, DiskWrite};
pub use entry::CacheEntry;
pub use key::{file_name_for, CacheKey};
pub use lru::LruTracker;
pub use memory::{BoundedMap, LruMap, MemoryTier};
pub use stats::CacheStats;
pub use store::{BytesCache, JsonCache, TieredCache};
