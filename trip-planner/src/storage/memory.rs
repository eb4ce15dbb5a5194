//! In-memory storage backend.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::RwLock;

use super::{KeyValueStorage, StorageError};

/// Process-local storage backend.
///
/// Clones share the same underlying map, so a test can keep a handle while
/// the store owns another. Reads and writes can be made to fail on demand.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    values: RwLock<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_once: Mutex<HashSet<String>>,
    writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-populated with the given entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        Self {
            inner: Arc::new(Inner {
                values: RwLock::new(map),
                ..Inner::default()
            }),
        }
    }

    /// Make every subsequent read fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make only the next read of `key` fail.
    pub fn fail_next_read_of(&self, key: &str) {
        self.inner
            .fail_once
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string());
    }

    /// Make every subsequent write and remove fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Current value under `key`, bypassing fault injection.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.inner.values.read().await.get(key).cloned()
    }

    /// Whether `key` is present, bypassing fault injection.
    pub async fn contains(&self, key: &str) -> bool {
        self.inner.values.read().await.contains_key(key)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn read<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StorageError>> {
        async move {
            let fail_once = self
                .inner
                .fail_once
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(key);
            if fail_once || self.inner.fail_reads.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable(format!("read of {key} refused")));
            }
            Ok(self.inner.values.read().await.get(key).cloned())
        }
        .boxed()
    }

    fn write<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        async move {
            if self.inner.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable(format!("write of {key} refused")));
            }
            self.inner
                .values
                .write()
                .await
                .insert(key.to_string(), value.to_string());
            self.inner.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        .boxed()
    }

    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        async move {
            if self.inner.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable(format!("remove of {key} refused")));
            }
            self.inner.values.write().await.remove(key);
            Ok(())
        }
        .boxed()
    }
}
