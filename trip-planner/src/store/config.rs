//! Store configuration.

/// Storage key of the persisted route state.
pub const DEFAULT_STATE_KEY: &str = "route-storage";

/// Key written by the old standalone recent-searches helper.
pub const LEGACY_RECENT_SEARCHES_KEY: &str = "recentSearches";

/// Configuration for [`RouteStore`](super::RouteStore).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Storage key holding the serialized state.
    pub state_key: String,

    /// Key of the legacy bare list of recent searches, if any.
    pub legacy_recent_searches_key: Option<String>,

    /// Fold legacy recent searches into the state on open, then delete them.
    pub migrate_legacy: bool,

    /// Capacity of the persist outcome channel. Slow subscribers that fall
    /// further behind than this miss outcomes.
    pub outcome_capacity: usize,
}

impl StoreConfig {
    /// Use a different state key.
    pub fn with_state_key(mut self, key: impl Into<String>) -> Self {
        self.state_key = key.into();
        self
    }

    /// Disable legacy migration.
    pub fn without_legacy_migration(mut self) -> Self {
        self.migrate_legacy = false;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            state_key: DEFAULT_STATE_KEY.to_string(),
            legacy_recent_searches_key: Some(LEGACY_RECENT_SEARCHES_KEY.to_string()),
            migrate_legacy: true,
            outcome_capacity: 64,
        }
    }
}
