//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Configuration for the trip planner server binary.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address to listen on.
    pub addr: SocketAddr,

    /// Directory for persisted state.
    pub storage_dir: PathBuf,

    /// Route dataset to load instead of the bundled one.
    pub dataset_path: Option<PathBuf>,

    /// Directory of static assets served under `/static`.
    pub static_dir: PathBuf,
}

/// Errors from reading server configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

impl ServerConfig {
    /// Read configuration from `TRIP_PLANNER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// unset or empty variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get("TRIP_PLANNER_ADDR") {
            config.addr = value.parse().map_err(|_| ConfigError::InvalidValue {
                var: "TRIP_PLANNER_ADDR",
                value: value.clone(),
            })?;
        }
        if let Some(value) = get("TRIP_PLANNER_STORAGE_DIR") {
            config.storage_dir = PathBuf::from(value);
        }
        if let Some(value) = get("TRIP_PLANNER_DATASET") {
            config.dataset_path = Some(PathBuf::from(value));
        }
        if let Some(value) = get("TRIP_PLANNER_STATIC_DIR") {
            config.static_dir = PathBuf::from(value);
        }

        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            storage_dir: PathBuf::from("data/storage"),
            dataset_path: None,
            static_dir: PathBuf::from("static"),
        }
    }
}
