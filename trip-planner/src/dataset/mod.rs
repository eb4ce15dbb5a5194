//! The static route dataset.
//!
//! Routes are loaded wholesale, validated once, and never change afterwards.
//! A copy of the dataset ships inside the binary; a different file can be
//! supplied at startup.

mod error;

use std::collections::HashMap;
use std::path::Path;

use crate::domain::{Route, RouteId};

pub use error::DatasetError;

/// Dataset compiled into the binary.
const BUNDLED_ROUTES: &str = include_str!("../../data/routes.json");

/// Read-only, ordered collection of routes with lookup by id.
#[derive(Debug, Clone)]
pub struct RouteDataset {
    routes: Vec<Route>,
    by_id: HashMap<RouteId, usize>,
}

impl RouteDataset {
    /// Load the dataset shipped with the binary.
    pub fn bundled() -> Result<Self, DatasetError> {
        Self::from_json(BUNDLED_ROUTES)
    }

    /// Load a dataset from a JSON file containing an array of routes.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| DatasetError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&json)
    }

    /// Parse a JSON array of routes.
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        let routes: Vec<Route> = serde_json::from_str(json).map_err(|e| DatasetError::Json {
            message: e.to_string(),
        })?;
        Self::from_routes(routes)
    }

    /// Build a dataset from already-parsed routes, validating each one.
    pub fn from_routes(routes: Vec<Route>) -> Result<Self, DatasetError> {
        let mut by_id = HashMap::with_capacity(routes.len());

        for (i, route) in routes.iter().enumerate() {
            route.validate()?;
            if by_id.insert(route.id.clone(), i).is_some() {
                return Err(DatasetError::DuplicateRoute(route.id.to_string()));
            }
        }

        Ok(Self { routes, by_id })
    }

    /// All routes, in dataset order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Look up a route by id.
    pub fn get(&self, id: &str) -> Option<&Route> {
        let id = RouteId::parse(id).ok()?;
        self.by_id.get(&id).map(|&i| &self.routes[i])
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
