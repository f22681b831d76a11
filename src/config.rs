//! Configuration Module
//!
//! Handles building, loading and validating cache configuration.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CacheError, Result};

// == Defaults ==
/// Default number of entries kept in the memory tier
pub const DEFAULT_MAX_MEMORY_COUNT: usize = 100;

/// Default disk quota in bytes
pub const DEFAULT_MAX_DISK_BYTES: u64 = 100_000_000;

/// Default time-to-live (24 hours)
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default interval between background maintenance runs (5 minutes)
pub const DEFAULT_MAINTENANCE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Directory created under the platform cache root
const ROOT_DIR_NAME: &str = "tiercache";

/// Cache configuration parameters.
///
/// Fixed once a cache is constructed. Every cache instance owns the directory
/// `cache_dir()`, so two instances with different namespaces never collide.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Name of this cache instance, used as its directory name
    pub namespace: String,
    /// Parent directory for all namespaces, None = platform cache directory
    pub root_dir: Option<PathBuf>,
    /// Maximum number of live entries in the memory tier
    pub max_memory_count: usize,
    /// Maximum total size of files in the disk tier
    pub max_disk_bytes: u64,
    /// Time after which a written entry is stale
    pub ttl: Duration,
    /// Interval between background maintenance runs
    pub maintenance_interval: Duration,
}

impl CacheConfig {
    /// Creates a configuration with default limits for the given namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            root_dir: None,
            max_memory_count: DEFAULT_MAX_MEMORY_COUNT,
            max_disk_bytes: DEFAULT_MAX_DISK_BYTES,
            ttl: DEFAULT_TTL,
            maintenance_interval: DEFAULT_MAINTENANCE_INTERVAL,
        }
    }

    /// Creates a new CacheConfig by loading limits from environment variables.
    ///
    /// # Environment Variables
    /// - `TIERCACHE_MAX_MEMORY_COUNT` - Memory tier entry limit (default: 100)
    /// - `TIERCACHE_MAX_DISK_BYTES` - Disk quota in bytes (default: 100000000)
    /// - `TIERCACHE_TTL_SECS` - TTL in seconds (default: 86400)
    /// - `TIERCACHE_MAINTENANCE_INTERVAL_SECS` - Maintenance interval (default: 300)
    /// - `TIERCACHE_ROOT_DIR` - Parent directory for cache namespaces
    pub fn from_env(namespace: impl Into<String>) -> Self {
        Self::from_lookup(namespace, |name| env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(namespace: impl Into<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |name: &str| lookup(name).and_then(|v| v.trim().parse::<u64>().ok());
        let defaults = Self::new(namespace);

        Self {
            root_dir: lookup("TIERCACHE_ROOT_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            max_memory_count: lookup("TIERCACHE_MAX_MEMORY_COUNT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_memory_count),
            max_disk_bytes: parsed("TIERCACHE_MAX_DISK_BYTES").unwrap_or(defaults.max_disk_bytes),
            ttl: parsed("TIERCACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.ttl),
            maintenance_interval: parsed("TIERCACHE_MAINTENANCE_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.maintenance_interval),
            ..defaults
        }
    }

    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(root_dir.into());
        self
    }

    pub fn with_max_memory_count(mut self, max_memory_count: usize) -> Self {
        self.max_memory_count = max_memory_count;
        self
    }

    pub fn with_max_disk_bytes(mut self, max_disk_bytes: u64) -> Self {
        self.max_disk_bytes = max_disk_bytes;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_maintenance_interval(mut self, interval: Duration) -> Self {
        self.maintenance_interval = interval;
        self
    }

    // == Cache Directory ==
    /// Returns the directory owned by this cache instance.
    pub fn cache_dir(&self) -> PathBuf {
        let root = match &self.root_dir {
            Some(root) => root.clone(),
            None => dirs::cache_dir()
                .unwrap_or_else(env::temp_dir)
                .join(ROOT_DIR_NAME),
        };
        root.join(&self.namespace)
    }

    // == Validate ==
    /// Checks the invariants the cache relies on.
    ///
    /// The namespace becomes a single directory name, so it must be non-empty
    /// and must not be able to escape the root directory.
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(CacheError::InvalidConfig(
                "ttl must be greater than zero".to_string(),
            ));
        }

        if self.maintenance_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "maintenance_interval must be greater than zero".to_string(),
            ));
        }

        let namespace = self.namespace.trim();
        if namespace.is_empty() {
            return Err(CacheError::InvalidConfig(
                "namespace must not be empty".to_string(),
            ));
        }

        let mut components = Path::new(namespace).components();
        let single_normal = matches!(
            (components.next(), components.next()),
            (Some(std::path::Component::Normal(_)), None)
        );
        if !single_normal || namespace.contains(&['/', '\\'][..]) {
            return Err(CacheError::InvalidConfig(format!(
                "namespace '{}' must be a single directory name",
                self.namespace
            )));
        }

        Ok(())
    }
}
