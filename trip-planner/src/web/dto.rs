//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Route, RouteExtent, SearchQuery};

/// Query string of a route search.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub origin: String,

    #[serde(default)]
    pub destination: String,

    /// Whether to remember this search. Suggested searches pass `false`.
    #[serde(default = "default_record")]
    pub record: bool,
}

fn default_record() -> bool {
    true
}

/// Query string of a save toggle submitted from a page form.
#[derive(Debug, Default, Deserialize)]
pub struct SaveParams {
    /// Local path to go back to after the toggle.
    pub return_to: Option<String>,
}

/// A route in search results, with its saved flag.
#[derive(Debug, Serialize)]
pub struct RouteResult {
    #[serde(flatten)]
    pub route: Route,

    /// Whether the user has saved this route
    pub saved: bool,
}

/// Response for a route search.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// The search as recorded in recent searches
    pub query: SearchQuery,

    /// Matching routes, in dataset order
    pub routes: Vec<RouteResult>,
}

/// Response for a single route.
#[derive(Debug, Serialize)]
pub struct RouteDetailResponse {
    pub route: Route,
    pub saved: bool,

    /// Map viewport covering the route, if any step has coordinates
    pub extent: Option<RouteExtent>,
}

/// Response after toggling a saved route.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub id: String,
    pub saved: bool,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
