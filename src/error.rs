//! Error types for the tiered cache
//!
//! Provides unified error handling using thiserror.
//!
//! Only construction can fail. Once a cache exists, storage problems are
//! logged and turned into misses or no-ops instead of being returned.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the tiered cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backing cache directory could not be created
    #[error("Failed to create cache directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration violates a cache invariant
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the tiered cache.
pub type Result<T> = std::result::Result<T, CacheError>;
