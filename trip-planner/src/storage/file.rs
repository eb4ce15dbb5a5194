//! File-backed storage: one file per key.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::debug;

use super::{KeyValueStorage, StorageError};

/// Shared by every instance so temp names never collide within a process.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Configuration for the file storage backend.
#[derive(Debug, Clone)]
pub struct FileStorageConfig {
    /// Directory holding one file per key.
    pub root: PathBuf,
}

impl FileStorageConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        // Default to a directory under the current working directory
        Self::new("data/storage")
    }
}

/// Storage backend writing each key to its own file.
///
/// Writes go to a temporary file in the same directory and are then renamed
/// over the target, so a reader never sees a half-written value. Temp names
/// carry the process id and a process-wide counter, so several instances
/// (or processes) may share a root; the last rename wins.
#[derive(Debug)]
pub struct FileStorage {
    config: FileStorageConfig,
}

impl FileStorage {
    pub fn new(config: FileStorageConfig) -> Self {
        Self { config }
    }

    /// Get the storage root directory.
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Path of the file backing `key`.
    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.config.root.join(key))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let pid = std::process::id();
        self.config.root.join(format!(".{key}.{pid}.{n}.tmp"))
    }

    async fn write_atomic(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let target = self.path_for(key)?;

        // Create the root directory if needed
        tokio::fs::create_dir_all(&self.config.root)
            .await
            .map_err(|e| StorageError::io(key, e))?;

        let tmp = self.temp_path(key);

        if let Err(e) = tokio::fs::write(&tmp, value).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StorageError::io(key, e));
        }

        if let Err(e) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StorageError::io(key, e));
        }

        debug!(key, bytes = value.len(), "wrote storage file");
        Ok(())
    }
}

/// Keys map directly to file names, so only a conservative character set is
/// accepted and hidden names are reserved for temporary files.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

impl KeyValueStorage for FileStorage {
    fn read<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StorageError>> {
        async move {
            let path = self.path_for(key)?;
            match tokio::fs::read_to_string(&path).await {
                Ok(contents) => Ok(Some(contents)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(StorageError::io(key, e)),
            }
        }
        .boxed()
    }

    fn write<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        self.write_atomic(key, value).boxed()
    }

    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        async move {
            let path = self.path_for(key)?;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StorageError::io(key, e)),
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn storage_in(dir: &Path) -> FileStorage {
        FileStorage::new(FileStorageConfig::new(dir))
    }

    #[tokio::test]
    async fn write_and_read() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path());

        storage.write("route-storage", "{\"a\":1}").await.unwrap();

        let loaded = storage.read("route-storage").await.unwrap();
        assert_eq!(loaded.as_deref(), Some("{\"a\":1}"));
    }

    #[tokio::test]
    async fn overwrite_replaces_value() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path());

        storage.write("k", "first").await.unwrap();
        storage.write("k", "second").await.unwrap();

        assert_eq!(storage.read("k").await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn no_temp_files_left_behind() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path());

        storage.write("k", "v").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["k".to_string()]);
    }

    #[test]
    fn instances_use_distinct_temp_names() {
        let a = storage_in(Path::new("shared"));
        let b = storage_in(Path::new("shared"));
        assert_ne!(a.temp_path("k"), b.temp_path("k"));
    }

    #[tokio::test]
    async fn concurrent_writers_on_one_root() {
        let dir = tempdir().unwrap();
        let a = storage_in(dir.path());
        let b = storage_in(dir.path());
        let long_a = "a".repeat(64 * 1024);
        let long_b = "b".repeat(64 * 1024);

        let (ra, rb) = tokio::join!(a.write("k", &long_a), b.write("k", &long_b));
        ra.unwrap();
        rb.unwrap();

        let stored = a.read("k").await.unwrap().unwrap();
        assert!(stored == long_a || stored == long_b);
    }

    #[tokio::test]
    async fn missing_key_returns_none() {
        let storage = storage_in(Path::new("/nonexistent/path/storage"));
        assert_eq!(storage.read("route-storage").await.unwrap(), None);
    }

    #[tokio::test]
    async fn remove_missing_key_is_ok() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path());

        storage.write("k", "v").await.unwrap();
        storage.remove("k").await.unwrap();
        storage.remove("k").await.unwrap();
        assert_eq!(storage.read("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn creates_root_directory() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("dir");
        let storage = storage_in(&root);

        storage.write("k", "v").await.unwrap();
        assert!(root.join("k").exists());
    }

    #[tokio::test]
    async fn rejects_unsafe_keys() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path());

        for key in ["", "../escape", "a/b", ".hidden", "spaces here"] {
            assert!(
                matches!(
                    storage.write(key, "v").await,
                    Err(StorageError::InvalidKey(_))
                ),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn accepts_plain_keys() {
        assert!(validate_key("route-storage").is_ok());
        assert!(validate_key("recentSearches").is_ok());
        assert!(validate_key("state_v1.json").is_ok());
    }
}
