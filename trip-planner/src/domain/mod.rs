//! Domain types for the trip planner.
//!
//! Routes come from the bundled dataset and are immutable once loaded;
//! search queries are built from user input. Validation happens at the
//! edges (`SearchQuery::new`, `Route::validate`), so code holding these
//! types can trust them.

mod error;
mod extent;
mod format;
mod location;
mod popular;
mod route;
mod search;

pub use error::DomainError;
pub use extent::RouteExtent;
pub use format::{format_distance, format_duration, format_fare, format_optional_distance};
pub use location::{Coordinates, Location};
pub use popular::{CURRENT_LOCATION, POPULAR_DESTINATIONS, PopularDestination};
pub use route::{Route, RouteId, RouteStep, StepKind};
pub use search::SearchQuery;

#[cfg(test)]
pub(crate) use route::fixtures;
