//! Application state for the web layer.

use std::sync::Arc;

use crate::dataset::RouteDataset;
use crate::domain::Route;
use crate::store::RouteStore;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Saved routes and recent searches
    pub store: RouteStore,

    /// Static route dataset
    pub dataset: Arc<RouteDataset>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(store: RouteStore, dataset: RouteDataset) -> Self {
        Self {
            store,
            dataset: Arc::new(dataset),
        }
    }

    /// Find a route by id, in the dataset first and then among saved routes.
    ///
    /// Saved routes hold a full copy, so they stay viewable even if the
    /// dataset no longer contains them.
    pub fn find_route(&self, id: &str) -> Option<Route> {
        self.dataset.get(id).cloned().or_else(|| {
            self.store
                .saved_routes()
                .into_iter()
                .find(|r| r.id.as_str() == id)
        })
    }
}
