//! Tiercache - A two-tier memory + disk cache
//!
//! Avoids recomputing or re-fetching derived artifacts (encoded objects,
//! binary blobs) while bounding memory by entry count and disk by bytes, with
//! every entry expiring after a fixed TTL.
//!
//! ```ignore
//! let config = CacheConfig::new("thumbnails").with_max_disk_bytes(50_000_000);
//! let cache: BytesCache<String> = TieredCache::open(config).await?;
//!
//! cache.set("item-42".to_string(), png_bytes).await;
//! let hit = cache.get(&"item-42".to_string()).await;
//! ```

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{
    AccessPattern, BytesCache, BytesCodec, CacheKey, CacheStats, Codec, JsonCache, JsonCodec,
    MemoryOnlyCodec, TieredCache,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use tasks::spawn_maintenance_task;
