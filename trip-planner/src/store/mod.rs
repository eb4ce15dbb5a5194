//! Saved routes and recent searches.
//!
//! [`RouteStore`] is the single authoritative copy of [`RouteState`].
//! Mutations apply synchronously in memory and enqueue a background write of
//! the full state; storage faults are logged and reported to subscribers
//! but never undo a mutation or reach the caller.

mod config;
mod persist;
mod route_store;
mod state;

pub use config::{DEFAULT_STATE_KEY, LEGACY_RECENT_SEARCHES_KEY, StoreConfig};
pub use persist::PersistOutcome;
pub use route_store::RouteStore;
pub use state::{MAX_RECENT_SEARCHES, RouteState};
