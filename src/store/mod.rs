//! Key-value store holding serialized scoring results.
//!
//! The gateway only depends on the [`Store`] contract. [`RedisStore`] is the
//! production backend; [`MemoryStore`] keeps entries in-process.

pub mod error;
pub mod memory;
pub mod redis;


pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use redis::{RedisStore, RedisStoreConfig};

use crate::key::CacheKey;

/// Minimal async key-value interface used by the gateway.
///
/// `set` replaces any prior value under the key; entries never expire.
pub trait Store: Send + Sync {
    /// Returns the bytes stored under `key`, or `None` if absent.
    fn get(
        &self,
        key: &CacheKey,
    ) -> impl std::future::Future<Output = StoreResult<Option<Vec<u8>>>> + Send;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(
        &self,
        key: &CacheKey,
        value: Vec<u8>,
    ) -> impl std::future::Future<Output = StoreResult<()>> + Send;

    /// Liveness check.
    fn ping(&self) -> impl std::future::Future<Output = StoreResult<()>> + Send;
}

impl<T: Store> Store for std::sync::Arc<T> {
    async fn get(&self, key: &CacheKey) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &CacheKey, value: Vec<u8>) -> StoreResult<()> {
        (**self).set(key, value).await
    }

    async fn ping(&self) -> StoreResult<()> {
        (**self).ping().await
    }
}
