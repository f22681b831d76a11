//! Maintenance Task
//!
//! Background task that periodically prunes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, Codec, TieredCache};

/// Spawns a background task that periodically prunes expired entries.
///
/// The task runs in an infinite loop, sleeping for `interval` between runs.
/// Each run takes the cache's exclusive lock, like any other mutation. A zero
/// `interval` falls back to the cache's configured maintenance interval.
///
/// # Returns
/// A JoinHandle for the spawned task, which the owner aborts on shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(JsonCache::<String, Item>::open(config).await?);
/// let handle = spawn_maintenance_task(cache.clone(), cache.maintenance_interval());
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_maintenance_task<K, V, C>(
    cache: Arc<TieredCache<K, V, C>>,
    interval: Duration,
) -> JoinHandle<()>
where
    K: CacheKey,
    V: Clone + Send + Sync + 'static,
    C: Codec<V>,
{
    let interval = if interval.is_zero() {
        warn!(
            "Zero maintenance interval for '{}', using {:?}",
            cache.namespace(),
            cache.maintenance_interval()
        );
        cache.maintenance_interval()
    } else {
        interval
    };

    tokio::spawn(async move {
        info!(
            "Starting maintenance task for '{}' with interval of {:?}",
            cache.namespace(),
            interval
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.prune_expired().await;

            if removed > 0 {
                let stats = cache.stats_with_usage().await;
                info!(
                    "Cache '{}' maintenance: removed {} expired entries, hit rate {:.1}%, {} in memory, {:?} bytes on disk",
                    stats.namespace,
                    removed,
                    stats.hit_rate() * 100.0,
                    stats.memory_entries,
                    stats.disk_bytes
                );
            } else {
                debug!("Cache '{}' maintenance: no expired entries found", cache.namespace());
            }
        }
    })
}
