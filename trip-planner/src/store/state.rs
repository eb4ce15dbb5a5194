//! The persisted aggregate: saved routes and recent searches.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{Route, SearchQuery};
use crate::storage::StorageError;

/// Maximum number of remembered searches.
pub const MAX_RECENT_SEARCHES: usize = 5;

/// Version written into the persisted envelope.
const STATE_VERSION: u32 = 0;

/// Saved routes and recent searches, newest first.
///
/// Invariants, maintained by every method:
/// - saved route ids are unique
/// - recent searches are unique by (origin, destination)
/// - at most [`MAX_RECENT_SEARCHES`] recent searches
/// - removal never reorders the remaining entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteState {
    #[serde(default)]
    saved_routes: Vec<Route>,
    #[serde(default)]
    recent_searches: Vec<SearchQuery>,
}

/// On-disk layout: the state wrapped with a format version.
#[derive(Serialize, Deserialize)]
struct Envelope<S> {
    state: S,
    #[serde(default)]
    version: u32,
}

impl RouteState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved_routes(&self) -> &[Route] {
        &self.saved_routes
    }

    pub fn recent_searches(&self) -> &[SearchQuery] {
        &self.recent_searches
    }

    pub fn is_saved(&self, route_id: &str) -> bool {
        self.saved_routes.iter().any(|r| r.id == *route_id)
    }

    /// Save `route` as the most recent entry.
    ///
    /// Returns `false` (and leaves the state alone) if a route with the same
    /// id is already saved.
    pub fn add_saved_route(&mut self, route: Route) -> bool {
        if self.is_saved(route.id.as_str()) {
            return false;
        }
        self.saved_routes.insert(0, route);
        true
    }

    /// Remove the saved route with `route_id`. Returns whether one was removed.
    pub fn remove_saved_route(&mut self, route_id: &str) -> bool {
        let before = self.saved_routes.len();
        self.saved_routes.retain(|r| r.id != *route_id);
        self.saved_routes.len() != before
    }

    /// Record `query` as the most recent search.
    ///
    /// An older search for the same pair is dropped rather than duplicated,
    /// and the oldest entries fall off past [`MAX_RECENT_SEARCHES`].
    pub fn add_recent_search(&mut self, query: SearchQuery) {
        self.recent_searches.retain(|s| !s.same_pair(&query));
        self.recent_searches.insert(0, query);
        self.recent_searches.truncate(MAX_RECENT_SEARCHES);
    }

    pub fn clear_recent_searches(&mut self) {
        self.recent_searches.clear();
    }

    /// Merge searches recorded elsewhere into the recent list.
    ///
    /// Entries are ordered by timestamp, newest first; on equal timestamps
    /// existing entries come first. Duplicated pairs keep their newest entry.
    pub fn merge_recent_searches(&mut self, others: impl IntoIterator<Item = SearchQuery>) {
        let mut all: Vec<SearchQuery> = self.recent_searches.drain(..).chain(others).collect();
        all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let mut pairs = HashSet::new();
        all.retain(|s| pairs.insert((s.origin.clone(), s.destination.clone())));
        all.truncate(MAX_RECENT_SEARCHES);

        self.recent_searches = all;
    }

    /// Restore the invariants on state that came from outside, e.g. storage
    /// edited by hand. First occurrences win.
    pub fn normalized(mut self) -> Self {
        let mut ids = HashSet::new();
        self.saved_routes.retain(|r| ids.insert(r.id.clone()));

        let mut pairs = HashSet::new();
        self.recent_searches
            .retain(|s| pairs.insert((s.origin.clone(), s.destination.clone())));
        self.recent_searches.truncate(MAX_RECENT_SEARCHES);

        self
    }

    /// Serialize to the persisted JSON layout.
    pub fn encode(&self) -> Result<String, StorageError> {
        let envelope = Envelope {
            state: self,
            version: STATE_VERSION,
        };
        serde_json::to_string(&envelope).map_err(|e| StorageError::Serialize {
            message: e.to_string(),
        })
    }

    /// Parse the persisted JSON layout stored under `key`, restoring the
    /// invariants if the stored data violates them.
    pub fn decode(key: &str, text: &str) -> Result<Self, StorageError> {
        let envelope: Envelope<RouteState> =
            serde_json::from_str(text).map_err(|e| StorageError::Deserialize {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(envelope.state.normalized())
    }
}
