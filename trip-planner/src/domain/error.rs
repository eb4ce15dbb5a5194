//! Domain error types.
//!
//! These errors represent invalid input and inconsistent route data.
//! They are distinct from storage errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A required text field was blank
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// Fare is negative or not a number
    #[error("route {route}: fare must be a non-negative number")]
    InvalidFare { route: String },

    /// Two steps in one route share an id
    #[error("route {route}: duplicate step id {step}")]
    DuplicateStep { route: String, step: String },

    /// Bus number or name given on a walk, metro or wait step
    #[error("route {route}: step {step} has bus details but is not a bus step")]
    BusDetailsOnNonBusStep { route: String, step: String },
}
