//! Remembered origin/destination searches.

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// An origin/destination pair the user searched for.
///
/// Two queries refer to the same search when their origin and destination
/// match; the timestamp only records when it was last made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub origin: String,
    pub destination: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl SearchQuery {
    /// Create a query from raw user input.
    ///
    /// Both fields are trimmed; blank fields are rejected.
    pub fn new(origin: &str, destination: &str, timestamp: i64) -> Result<Self, DomainError> {
        let origin = origin.trim();
        let destination = destination.trim();

        if origin.is_empty() {
            return Err(DomainError::EmptyField("origin"));
        }
        if destination.is_empty() {
            return Err(DomainError::EmptyField("destination"));
        }

        Ok(Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            timestamp,
        })
    }

    /// Create a query stamped with the current wall-clock time.
    pub fn now(origin: &str, destination: &str) -> Result<Self, DomainError> {
        Self::new(origin, destination, chrono::Utc::now().timestamp_millis())
    }

    /// Whether `other` is a search for the same origin and destination.
    pub fn same_pair(&self, other: &SearchQuery) -> bool {
        self.origin == other.origin && self.destination == other.destination
    }
}
