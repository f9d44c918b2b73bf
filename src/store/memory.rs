//! In-process store.
//!
//! Used when no Redis host is configured and as the store double in tests. Reads and
//! writes can be switched to fail with [`StoreError::Unavailable`] to exercise the
//! gateway's degradation paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::{Store, StoreError, StoreResult};
use crate::key::CacheKey;

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    gets: AtomicUsize,
    sets: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes raw bytes directly, bypassing counters and fault injection.
    pub fn insert_raw(&self, key: &str, value: impl Into<Vec<u8>>) {
        self.entries.write().insert(key.to_string(), value.into());
    }

    /// Reads raw bytes directly, bypassing counters and fault injection.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Makes `get` and `ping` fail with [`StoreError::Unavailable`].
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes `set` fail with [`StoreError::Unavailable`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `get` calls observed (including failed ones).
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of `set` calls observed (including failed ones).
    pub fn set_count(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

impl Store for MemoryStore {
    async fn get(&self, key: &CacheKey) -> StoreResult<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("memory store reads disabled"));
        }
        Ok(self.entries.read().get(key.as_str()).cloned())
    }

    async fn set(&self, key: &CacheKey, value: Vec<u8>) -> StoreResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("memory store writes disabled"));
        }
        self.entries.write().insert(key.as_str().to_string(), value);
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("memory store reads disabled"));
        }
        Ok(())
    }
}
