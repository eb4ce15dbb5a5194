//! Dataset loading errors.

use std::path::PathBuf;

use crate::domain::DomainError;

/// Errors that can occur when loading the route dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// Dataset file could not be read
    #[error("failed to read dataset {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Dataset is not valid JSON for a list of routes
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// A route breaks a domain rule
    #[error("invalid route: {0}")]
    InvalidRoute(#[from] DomainError),

    /// Two routes share an id
    #[error("duplicate route id: {0}")]
    DuplicateRoute(String),
}
