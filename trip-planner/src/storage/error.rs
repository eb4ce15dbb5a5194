//! Storage error types.

use std::sync::Arc;

/// Errors that can occur when reading, writing or removing a stored value.
///
/// Cloneable so that persistence outcomes can be handed to every
/// subscriber of the store's monitoring channel.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    /// Underlying I/O failed
    #[error("I/O error on key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Value could not be encoded for storage
    #[error("failed to serialize state: {message}")]
    Serialize { message: String },

    /// Stored value could not be decoded
    #[error("failed to parse value under key {key}: {message}")]
    Deserialize { key: String, message: String },

    /// Key contains characters the backend cannot store
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Backend refused the operation
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Persist worker is no longer running
    #[error("persist worker stopped")]
    WorkerStopped,
}

impl StorageError {
    pub(crate) fn io(key: &str, source: std::io::Error) -> Self {
        StorageError::Io {
            key: key.to_string(),
            source: Arc::new(source),
        }
    }
}
