//! Durable key-value storage.
//!
//! The store persists its whole state as one text blob under a well-known
//! key. Backends implement [`KeyValueStorage`]; the trait is object safe so
//! that the store can hold an `Arc<dyn KeyValueStorage>` chosen at startup.
//!
//! - [`MemoryStorage`]: process-local map, used in tests and by
//!   `RouteStore::in_memory`.
//! - [`FileStorage`]: one file per key under a root directory.

mod error;
mod file;
mod memory;

use futures::future::BoxFuture;

pub use error::StorageError;
pub use file::{FileStorage, FileStorageConfig};
pub use memory::MemoryStorage;

/// Asynchronous get/set/remove of named text blobs.
///
/// Implementations hold no state that matters to callers beyond the stored
/// values themselves.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value under `key`.
    ///
    /// A key that was never written is `Ok(None)`, not an error.
    fn read<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StorageError>>;

    /// Replace the value under `key`.
    ///
    /// Readers observe either the old or the new value, never a partial one.
    fn write<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>>;

    /// Delete `key`. Removing a missing key succeeds.
    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>>;
}
