//! Cache Key Module
//!
//! Keys need a byte representation that is identical in every process and
//! every build, because the disk tier derives file names from it. Rust's
//! `Hash` gives no such guarantee, so it is only used for the memory tier.

use std::borrow::Cow;
use std::fmt::Debug;
use std::hash::Hash;

use sha2::{Digest, Sha256};

// == Cache Key ==
/// A key usable by both tiers.
///
/// Two keys that compare equal must return the same `key_bytes`.
pub trait CacheKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {
    fn key_bytes(&self) -> Cow<'_, [u8]>;
}

impl CacheKey for String {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl CacheKey for Vec<u8> {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

macro_rules! impl_cache_key_for_int {
    ($($ty:ty),*) => {
        $(
            impl CacheKey for $ty {
                fn key_bytes(&self) -> Cow<'_, [u8]> {
                    Cow::Owned(self.to_be_bytes().to_vec())
                }
            }
        )*
    };
}

impl_cache_key_for_int!(u32, u64, i64);

impl CacheKey for usize {
    // Widened so 32 and 64 bit builds share file names.
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Owned((*self as u64).to_be_bytes().to_vec())
    }
}

// == File Name ==
/// Returns the on-disk file name for `key`: lowercase hex SHA-256 of its bytes.
pub fn file_name_for<K: CacheKey>(key: &K) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.key_bytes());
    hex::encode(hasher.finalize())
}
