//! Routes and the steps that make them up.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::location::Location;

/// Identifier of a route in the dataset.
///
/// Route ids are opaque strings; the only requirement is that they are
/// non-empty once trimmed.
///
/// # Examples
///
/// ```
/// use trip_planner::domain::RouteId;
///
/// let id = RouteId::parse("r1").unwrap();
/// assert_eq!(id.as_str(), "r1");
///
/// assert!(RouteId::parse("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    /// Parse a route id, rejecting blank input.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        if s.trim().is_empty() {
            return Err(DomainError::EmptyField("route id"));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteId({})", self.0)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for RouteId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Mode of travel for a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Walk,
    Bus,
    Metro,
    Wait,
}

impl StepKind {
    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            StepKind::Walk => "Walk",
            StepKind::Bus => "Bus",
            StepKind::Metro => "Metro",
            StepKind::Wait => "Wait",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One leg of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    /// Unique within the owning route.
    pub id: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: StepKind,
    /// Minutes.
    pub duration: u32,
    /// Meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_location: Option<Location>,
}

impl RouteStep {
    /// Create a step with no optional details.
    pub fn new(
        id: impl Into<String>,
        kind: StepKind,
        description: impl Into<String>,
        duration: u32,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            kind,
            duration,
            distance: None,
            bus_number: None,
            bus_name: None,
            start_location: None,
            end_location: None,
        }
    }

    pub fn with_distance(mut self, meters: u32) -> Self {
        self.distance = Some(meters);
        self
    }

    pub fn with_bus(mut self, number: impl Into<String>, name: Option<String>) -> Self {
        self.bus_number = Some(number.into());
        self.bus_name = name;
        self
    }

    pub fn with_locations(mut self, start: Location, end: Location) -> Self {
        self.start_location = Some(start);
        self.end_location = Some(end);
        self
    }

    /// Start and end location, if both are known.
    pub fn endpoints(&self) -> Option<(&Location, &Location)> {
        Some((self.start_location.as_ref()?, self.end_location.as_ref()?))
    }
}

/// A complete origin-to-destination trip option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    pub origin: Location,
    pub destination: Location,
    /// Minutes.
    pub duration: u32,
    /// Meters.
    pub distance: u32,
    /// In PKR.
    pub fare: f64,
    pub steps: Vec<RouteStep>,
}

impl Route {
    /// Check the invariants a route must satisfy to be shown or saved.
    ///
    /// - id is not blank
    /// - fare is finite and non-negative
    /// - step ids are unique within the route
    /// - bus number/name only appear on bus steps
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.as_str().trim().is_empty() {
            return Err(DomainError::EmptyField("route id"));
        }

        if !self.fare.is_finite() || self.fare < 0.0 {
            return Err(DomainError::InvalidFare {
                route: self.id.to_string(),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.id.as_str()) {
                return Err(DomainError::DuplicateStep {
                    route: self.id.to_string(),
                    step: step.id.clone(),
                });
            }

            let has_bus_details = step.bus_number.is_some() || step.bus_name.is_some();
            if has_bus_details && step.kind != StepKind::Bus {
                return Err(DomainError::BusDetailsOnNonBusStep {
                    route: self.id.to_string(),
                    step: step.id.clone(),
                });
            }
        }

        Ok(())
    }

    /// Number of changes between vehicles (bus or metro).
    pub fn transfers(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.kind, StepKind::Bus | StepKind::Metro))
            .count()
            .saturating_sub(1)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A minimal valid route with the given id.
    pub fn route(id: &str) -> Route {
        Route {
            id: RouteId::parse(id).unwrap(),
            name: format!("Route {id}"),
            origin: Location::new("Liberty Market", 31.5106, 74.3441),
            destination: Location::new("Anarkali", 31.5675, 74.3131),
            duration: 35,
            distance: 8200,
            fare: 60.0,
            steps: vec![
                RouteStep::new("s1", StepKind::Walk, "Walk to Liberty Chowk stop", 5)
                    .with_distance(350),
                RouteStep::new("s2", StepKind::Bus, "Take the bus to Anarkali", 30)
                    .with_bus("FR-14", Some("Feeder Route 14".into())),
            ],
        }
    }
}
