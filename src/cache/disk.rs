//! Disk Tier Module
//!
//! One file per key inside the cache directory. A file's modification time is
//! its write timestamp: it drives both TTL expiry and quota eviction order, so
//! no metadata is kept anywhere else.
//!
//! The tier holds no mutable state of its own. Callers that mutate it
//! (`write`, `remove*`, `prune_expired`) must hold exclusive access; the
//! coordinator guarantees this with its read-write lock.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use crate::cache::key::{file_name_for, CacheKey};
use crate::clock::Clock;
use crate::error::{CacheError, Result};

/// Prefix of in-flight files; never visible under a final name
const TMP_PREFIX: &str = ".tmp-";

// == Read Outcome ==
/// Result of looking a key up on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiskRead {
    /// The file exists and is within its TTL
    Hit(Vec<u8>),
    /// No file, or it could not be read
    Miss,
    /// The file exists but is older than the TTL
    Expired,
}

// == Write Outcome ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskWrite {
    /// Whether the bytes landed under the final file name
    pub written: bool,
    /// Files deleted by the quota pass that followed
    pub evicted: usize,
}

/// A cache file as seen by a directory listing.
#[derive(Debug, Clone)]
struct DiskFile {
    name: String,
    path: PathBuf,
    size: u64,
    modified: DateTime<Utc>,
}

// == Disk Tier ==
pub struct DiskTier {
    dir: PathBuf,
    max_bytes: u64,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl DiskTier {
    // == Constructor ==
    /// Opens the tier, creating `dir` if needed.
    ///
    /// This is the only fallible operation: without a directory the tier cannot
    /// work at all.
    pub async fn open(
        dir: impl Into<PathBuf>,
        max_bytes: u64,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|source| CacheError::CreateDirectory {
                path: dir.clone(),
                source,
            })?;
        info!(cache_dir = ?dir, max_bytes, ttl_secs = ttl.as_secs(), "Disk tier ready");

        Ok(Self {
            dir,
            max_bytes,
            ttl,
            clock,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Final location of the file for `key`.
    pub fn path_for<K: CacheKey>(&self, key: &K) -> PathBuf {
        self.dir.join(file_name_for(key))
    }

    // == Write ==
    /// Stores `bytes` for `key`, then enforces the quota.
    ///
    /// The bytes go to a temporary file that is synced, stamped with the
    /// clock's current time and only then renamed over the final name, so a
    /// reader never sees a partial file.
    pub async fn write<K: CacheKey>(&self, key: &K, bytes: &[u8]) -> DiskWrite {
        let name = file_name_for(key);
        let final_path = self.dir.join(&name);
        let tmp_path = self.dir.join(format!("{}{}", TMP_PREFIX, name));
        let modified = SystemTime::from(self.clock.now());

        if let Err(e) = write_atomically(&tmp_path, &final_path, bytes, modified).await {
            warn!(key = ?key, error = %e, "Failed to write to disk cache");
            let _ = fs::remove_file(&tmp_path).await;
            return DiskWrite::default();
        }
        debug!(key = ?key, size = bytes.len(), "Saved to disk cache");

        DiskWrite {
            written: true,
            evicted: self.enforce_quota().await,
        }
    }

    // == Read ==
    /// Looks `key` up without modifying anything.
    ///
    /// An expired file is reported as [`DiskRead::Expired`]; deleting it is a
    /// mutation, left to [`DiskTier::remove_if_expired`].
    pub async fn read<K: CacheKey>(&self, key: &K) -> DiskRead {
        let path = self.path_for(key);

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return DiskRead::Miss,
            Err(e) => {
                warn!(key = ?key, error = %e, "Failed to stat disk cache file");
                return DiskRead::Miss;
            }
        };

        if self.is_expired(modified_at(&metadata), self.clock.now()) {
            return DiskRead::Expired;
        }

        match fs::read(&path).await {
            Ok(bytes) => {
                debug!(key = ?key, "Loaded from disk cache");
                DiskRead::Hit(bytes)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => DiskRead::Miss,
            Err(e) => {
                warn!(key = ?key, error = %e, "Failed to load from disk cache");
                DiskRead::Miss
            }
        }
    }

    /// Deletes the file for `key` if it is still expired. Returns true if a
    /// file was deleted.
    pub async fn remove_if_expired<K: CacheKey>(&self, key: &K) -> bool {
        let path = self.path_for(key);
        let expired = match fs::metadata(&path).await {
            Ok(metadata) => self.is_expired(modified_at(&metadata), self.clock.now()),
            Err(_) => false,
        };

        if expired && remove_file_logged(&path).await {
            debug!(key = ?key, "Pruned expired disk cache entry");
            return true;
        }
        false
    }

    // == Remove ==
    /// Deletes the file for `key`. A missing file is not an error.
    pub async fn remove<K: CacheKey>(&self, key: &K) -> bool {
        let removed = remove_file_logged(&self.path_for(key)).await;
        if removed {
            debug!(key = ?key, "Removed from disk cache");
        }
        removed
    }

    /// Deletes every file in the cache directory, returning how many went.
    pub async fn remove_all(&self) -> usize {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                error!(cache_dir = ?self.dir, error = %e, "Failed to list disk cache");
                return 0;
            }
        };

        let mut removed = 0;
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    if remove_file_logged(&entry.path()).await {
                        removed += 1;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(cache_dir = ?self.dir, error = %e, "Failed to read disk cache entry");
                    break;
                }
            }
        }

        info!(cache_dir = ?self.dir, removed, "Cleared disk cache");
        removed
    }

    // == Total Bytes ==
    /// Sum of the sizes of all cache files.
    pub async fn total_bytes(&self) -> u64 {
        self.list_files().await.iter().map(|f| f.size).sum()
    }

    // == Prune Expired ==
    /// Deletes every file older than the TTL, plus temporary files left behind
    /// by an interrupted write. Individual failures are logged and skipped.
    pub async fn prune_expired(&self) -> usize {
        self.remove_stale_tmp_files().await;

        let now = self.clock.now();
        let mut removed = 0;
        for file in self.list_files().await {
            if self.is_expired(file.modified, now) && remove_file_logged(&file.path).await {
                removed += 1;
            }
        }

        if removed > 0 {
            debug!(cache_dir = ?self.dir, removed, "Pruned expired disk cache entries");
        }
        removed
    }

    // == Quota Enforcement ==
    /// Deletes files oldest-first until the total fits in `max_bytes`.
    ///
    /// Ties on modification time are broken by file name so the order is
    /// reproducible.
    async fn enforce_quota(&self) -> usize {
        let mut files = self.list_files().await;
        let mut total: u64 = files.iter().map(|f| f.size).sum();
        if total <= self.max_bytes {
            return 0;
        }

        files.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name)));

        let mut evicted = 0;
        for file in files {
            if total <= self.max_bytes {
                break;
            }
            if remove_file_logged(&file.path).await {
                total = total.saturating_sub(file.size);
                evicted += 1;
                debug!(file = %file.name, size = file.size, "Evicted disk cache entry over quota");
            }
        }

        if total > self.max_bytes {
            warn!(total, max_bytes = self.max_bytes, "Disk cache still over quota after eviction");
        }
        evicted
    }

    // == Helpers ==
    /// A file written at `modified` is stale from `modified + ttl` on, the same
    /// instant its memory copy expires.
    fn is_expired(&self, modified: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match (now - modified).to_std() {
            Ok(age) => age >= self.ttl,
            // Written "in the future" relative to now
            Err(_) => false,
        }
    }

    async fn list_files(&self) -> Vec<DiskFile> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                error!(cache_dir = ?self.dir, error = %e, "Failed to list disk cache");
                return Vec::new();
            }
        };

        let mut files = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(cache_dir = ?self.dir, error = %e, "Failed to read disk cache entry");
                    break;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(TMP_PREFIX) {
                continue;
            }

            // Vanished between listing and stat: simply not counted.
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }

            files.push(DiskFile {
                name,
                path: entry.path(),
                size: metadata.len(),
                modified: modified_at(&metadata),
            });
        }
        files
    }

    async fn remove_stale_tmp_files(&self) {
        let Ok(mut entries) = fs::read_dir(&self.dir).await else {
            return;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            if entry.file_name().to_string_lossy().starts_with(TMP_PREFIX) {
                remove_file_logged(&entry.path()).await;
            }
        }
    }
}

// == Utility Functions ==
async fn write_atomically(
    tmp_path: &Path,
    final_path: &Path,
    bytes: &[u8],
    modified: SystemTime,
) -> io::Result<()> {
    let mut file = fs::File::create(tmp_path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;

    let file = file.into_std().await;
    tokio::task::spawn_blocking(move || file.set_modified(modified))
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))??;

    fs::rename(tmp_path, final_path).await
}

/// Removes `path`, logging failures. Returns true if the file was deleted.
async fn remove_file_logged(path: &Path) -> bool {
    match fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            warn!(path = ?path, error = %e, "Failed to remove disk cache file");
            false
        }
    }
}

/// Modification time of a file; unreadable times sort as oldest.
fn modified_at(metadata: &std::fs::Metadata) -> DateTime<Utc> {
    metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| DateTime::<Utc>::from(std::time::UNIX_EPOCH))
}
