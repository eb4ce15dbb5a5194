//! Web layer for the trip planner.
//!
//! Provides HTTP endpoints for searching routes, viewing route details
//! and managing saved routes and recent searches.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
