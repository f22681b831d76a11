//! Serialization Adapter Module
//!
//! Converts cached values to and from bytes for the disk tier. A codec that
//! returns `None` is not an error: the value simply stays memory-only (on
//! encode) or counts as a disk miss (on decode).

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

// == Codec ==
/// Encodes and decodes values of type `V`.
pub trait Codec<V>: Send + Sync + 'static {
    fn encode(&self, value: &V) -> Option<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> Option<V>;
}

// == Bytes Codec ==
/// Raw byte payloads, stored unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl Codec<Vec<u8>> for BytesCodec {
    fn encode(&self, value: &Vec<u8>) -> Option<Vec<u8>> {
        Some(value.clone())
    }

    fn decode(&self, bytes: &[u8]) -> Option<Vec<u8>> {
        Some(bytes.to_vec())
    }
}

// == JSON Codec ==
/// Any serde type, stored as JSON.
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonCodec")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Codec<T> for JsonCodec<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    fn encode(&self, value: &T) -> Option<Vec<u8>> {
        match serde_json::to_vec(value) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(error = %e, "Failed to encode value, keeping it in memory only");
                None
            }
        }
    }

    fn decode(&self, bytes: &[u8]) -> Option<T> {
        match serde_json::from_slice(bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                // Typically a format change after an upgrade.
                warn!(error = %e, "Failed to decode cached value");
                None
            }
        }
    }
}

// == Memory Only Codec ==
/// Never persists anything; every value lives in the memory tier only.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryOnlyCodec;

impl<V: 'static> Codec<V> for MemoryOnlyCodec {
    fn encode(&self, _value: &V) -> Option<Vec<u8>> {
        None
    }

    fn decode(&self, _bytes: &[u8]) -> Option<V> {
        None
    }
}
