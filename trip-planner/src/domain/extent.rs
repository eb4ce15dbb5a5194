//! Map viewport covering a route.

use serde::Serialize;

use super::route::Route;

/// Padding factor applied to the bounding box of a route.
const PADDING: f64 = 1.5;

/// Smallest delta (degrees) so that very short routes are not over-zoomed.
const MIN_DELTA: f64 = 0.02;

/// A centre point plus the span to show around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteExtent {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl RouteExtent {
    /// Compute the extent over every step with both a start and end location.
    ///
    /// Returns `None` if no step has both.
    pub fn for_route(route: &Route) -> Option<Self> {
        let mut points = route
            .steps
            .iter()
            .filter_map(|s| s.endpoints())
            .flat_map(|(start, end)| [start.coordinates, end.coordinates]);

        let first = points.next()?;
        let (mut min_lat, mut max_lat) = (first.latitude, first.latitude);
        let (mut min_lng, mut max_lng) = (first.longitude, first.longitude);

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            latitude: (min_lat + max_lat) / 2.0,
            longitude: (min_lng + max_lng) / 2.0,
            latitude_delta: ((max_lat - min_lat) * PADDING).max(MIN_DELTA),
            longitude_delta: ((max_lng - min_lng) * PADDING).max(MIN_DELTA),
        })
    }
}
