//! The store handle shared across the application.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::domain::{Route, SearchQuery};
use crate::storage::{KeyValueStorage, StorageError};

use super::config::StoreConfig;
use super::persist::{PersistJob, PersistOutcome, PersistWorker};
use super::state::RouteState;

/// Handle to the saved-routes and recent-searches state.
///
/// Cloning is cheap and every clone sees the same state. Reads and
/// mutations never wait on storage: a mutation updates memory, then queues
/// a write of the full state for the background worker. Use
/// [`flush`](Self::flush) when the write must have landed, e.g. in tests or
/// at shutdown.
#[derive(Clone)]
pub struct RouteStore {
    shared: Arc<Shared>,
}

struct Shared {
    current: RwLock<Current>,
    jobs: mpsc::UnboundedSender<PersistJob>,
    outcomes: broadcast::Sender<PersistOutcome>,
}

struct Current {
    state: RouteState,
    /// Number of mutations applied since open.
    generation: u64,
}

/// What was found under the legacy recent-searches key.
enum LegacySearches {
    Found(Vec<SearchQuery>),
    Corrupt,
}

impl RouteStore {
    /// Open the store, restoring any previously persisted state.
    ///
    /// Never fails: missing state starts empty, and unreadable or corrupt
    /// state is logged and also starts empty. Legacy searches are only
    /// migrated when the state could be read. Must be called from within a
    /// Tokio runtime, which hosts the persist worker.
    pub async fn open(storage: Arc<dyn KeyValueStorage>, config: StoreConfig) -> Self {
        let restored = rehydrate(storage.as_ref(), &config.state_key).await;
        let state_readable = restored.is_some();
        let state = restored.unwrap_or_default();

        // Migrating over state that could not be read would overwrite it
        let legacy = match (&config.legacy_recent_searches_key, config.migrate_legacy) {
            (Some(key), true) if state_readable => read_legacy(storage.as_ref(), key)
                .await
                .map(|found| (key.clone(), found)),
            (Some(key), true) => {
                info!(key = %key, "state unreadable; legacy migration deferred");
                None
            }
            _ => None,
        };

        let (jobs, job_rx) = mpsc::unbounded_channel();
        let (outcomes, _) = broadcast::channel(config.outcome_capacity.max(1));

        let worker = PersistWorker::new(
            storage.clone(),
            config.state_key.clone(),
            outcomes.clone(),
        );
        tokio::spawn(worker.run(job_rx));

        let store = Self {
            shared: Arc::new(Shared {
                current: RwLock::new(Current {
                    state,
                    generation: 0,
                }),
                jobs,
                outcomes,
            }),
        };

        if let Some((key, found)) = legacy {
            store.migrate_legacy(storage.as_ref(), &key, found).await;
        }

        store
    }

    /// Open a store backed by fresh in-memory storage.
    pub async fn in_memory() -> Self {
        let storage = Arc::new(crate::storage::MemoryStorage::new());
        Self::open(storage, StoreConfig::default()).await
    }

    /// Fold the legacy recent-searches list into the state, then delete the
    /// legacy key once the merged state is durable.
    async fn migrate_legacy(
        &self,
        storage: &dyn KeyValueStorage,
        key: &str,
        found: LegacySearches,
    ) {
        match found {
            LegacySearches::Found(searches) => {
                let count = searches.len();
                self.mutate(|state| state.merge_recent_searches(searches));

                match self.flush().await {
                    Ok(()) => {
                        info!(key, count, "migrated legacy recent searches");
                        if let Err(e) = storage.remove(key).await {
                            warn!(key, error = %e, "failed to remove legacy recent searches");
                        }
                    }
                    Err(e) => warn!(
                        key,
                        error = %e,
                        "could not persist migrated searches; keeping legacy key"
                    ),
                }
            }
            LegacySearches::Corrupt => {
                if let Err(e) = storage.remove(key).await {
                    warn!(key, error = %e, "failed to remove corrupt legacy recent searches");
                }
            }
        }
    }

    /// Save a route as the most recent entry.
    ///
    /// Returns `false` if a route with the same id was already saved, in
    /// which case the saved list is unchanged.
    pub fn add_saved_route(&self, route: Route) -> bool {
        self.mutate(|state| state.add_saved_route(route))
    }

    /// Remove a saved route. Returns whether one was removed.
    pub fn remove_saved_route(&self, route_id: &str) -> bool {
        self.mutate(|state| state.remove_saved_route(route_id))
    }

    /// Save the route if it is not saved, otherwise remove it.
    ///
    /// Returns whether the route is saved afterwards.
    pub fn toggle_saved_route(&self, route: &Route) -> bool {
        self.mutate(|state| {
            if state.remove_saved_route(route.id.as_str()) {
                false
            } else {
                state.add_saved_route(route.clone())
            }
        })
    }

    /// Record a search as the most recent one.
    pub fn add_recent_search(&self, query: SearchQuery) {
        self.mutate(|state| state.add_recent_search(query));
    }

    pub fn clear_recent_searches(&self) {
        self.mutate(|state| state.clear_recent_searches());
    }

    pub fn is_saved(&self, route_id: &str) -> bool {
        self.read(|state| state.is_saved(route_id))
    }

    /// Saved routes, newest first.
    pub fn saved_routes(&self) -> Vec<Route> {
        self.read(|state| state.saved_routes().to_vec())
    }

    /// Recent searches, newest first.
    pub fn recent_searches(&self) -> Vec<SearchQuery> {
        self.read(|state| state.recent_searches().to_vec())
    }

    /// Copy of the whole state.
    pub fn snapshot(&self) -> RouteState {
        self.read(|state| state.clone())
    }

    /// Number of mutations applied since the store was opened.
    pub fn generation(&self) -> u64 {
        self.shared
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// Wait until every mutation made so far has been written.
    ///
    /// Returns the result of the last write the worker performed, so an
    /// `Err` means the latest state is not durable.
    pub async fn flush(&self) -> Result<(), StorageError> {
        let (reply, rx) = oneshot::channel();
        self.shared
            .jobs
            .send(PersistJob::Flush(reply))
            .map_err(|_| StorageError::WorkerStopped)?;
        rx.await.map_err(|_| StorageError::WorkerStopped)?
    }

    /// Subscribe to the outcome of every background write.
    pub fn subscribe(&self) -> broadcast::Receiver<PersistOutcome> {
        self.shared.outcomes.subscribe()
    }

    fn read<R>(&self, f: impl FnOnce(&RouteState) -> R) -> R {
        let current = self
            .shared
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&current.state)
    }

    /// Apply `f` and queue a write of the resulting state.
    ///
    /// The job is queued while the lock is held, so queue order matches
    /// mutation order.
    fn mutate<R>(&self, f: impl FnOnce(&mut RouteState) -> R) -> R {
        let mut current = self
            .shared
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let out = f(&mut current.state);
        current.generation += 1;

        let job = PersistJob::Write {
            generation: current.generation,
            state: current.state.clone(),
        };
        if self.shared.jobs.send(job).is_err() {
            warn!(
                generation = current.generation,
                "persist worker stopped; change kept in memory only"
            );
        }

        out
    }
}

/// Load the persisted state. Missing or corrupt state yields an empty state;
/// `None` means storage could not be read at all.
async fn rehydrate(storage: &dyn KeyValueStorage, key: &str) -> Option<RouteState> {
    match storage.read(key).await {
        Ok(None) => {
            debug!(key, "no persisted state; starting empty");
            Some(RouteState::new())
        }
        Ok(Some(text)) => match RouteState::decode(key, &text) {
            Ok(state) => {
                info!(
                    key,
                    saved = state.saved_routes().len(),
                    recent = state.recent_searches().len(),
                    "restored persisted state"
                );
                Some(state)
            }
            Err(e) => {
                warn!(key, error = %e, "persisted state is corrupt; starting empty");
                Some(RouteState::new())
            }
        },
        Err(e) => {
            warn!(key, error = %e, "could not read persisted state; starting empty");
            None
        }
    }
}

/// Read the legacy list. `None` when absent or unreadable; unreadable data
/// is left in place for a later attempt.
async fn read_legacy(storage: &dyn KeyValueStorage, key: &str) -> Option<LegacySearches> {
    let text = match storage.read(key).await {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "could not read legacy recent searches");
            return None;
        }
    };

    match serde_json::from_str::<Vec<SearchQuery>>(&text) {
        Ok(searches) => {
            // Legacy entries were written without validation
            let searches = searches
                .into_iter()
                .filter_map(|s| SearchQuery::new(&s.origin, &s.destination, s.timestamp).ok())
                .collect();
            Some(LegacySearches::Found(searches))
        }
        Err(e) => {
            warn!(key, error = %e, "legacy recent searches are corrupt; discarding");
            Some(LegacySearches::Corrupt)
        }
    }
}
