//! Askama templates for the web frontend.

use askama::Template;
use chrono::{TimeZone, Utc};

use crate::domain::{
    PopularDestination, Route, RouteExtent, RouteStep, SearchQuery, StepKind, format_distance,
    format_duration, format_fare, format_optional_distance,
};

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Home page: search form, recent searches and saved routes.
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub recent_searches: Vec<RecentSearchView>,
    pub saved_routes: Vec<RouteCardView>,
    pub popular_destinations: Vec<PopularDestination>,
    /// Origin of searches started from a suggestion.
    pub current_location: &'static str,
}

/// Search results page.
#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsTemplate {
    pub origin: String,
    pub destination: String,
    pub routes: Vec<RouteCardView>,
}

/// Route detail page.
#[derive(Template)]
#[template(path = "route_detail.html")]
pub struct RouteDetailTemplate {
    pub route: RouteCardView,
    pub steps: Vec<StepView>,
    pub extent: Option<RouteExtent>,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Summary of a route as shown on a card.
#[derive(Debug, Clone)]
pub struct RouteCardView {
    pub id: String,
    pub name: String,
    pub origin: String,
    pub destination: String,
    pub duration: String,
    pub distance: String,
    pub fare: String,
    pub transfers: usize,
    pub saved: bool,
    /// Page the save button returns to; the route page when unset.
    pub return_to: Option<String>,
}

impl RouteCardView {
    pub fn from_route(route: &Route, saved: bool) -> Self {
        Self {
            id: route.id.to_string(),
            name: route.name.clone(),
            origin: route.origin.name.clone(),
            destination: route.destination.name.clone(),
            duration: format_duration(route.duration),
            distance: format_distance(route.distance),
            fare: format_fare(route.fare),
            transfers: route.transfers(),
            saved,
            return_to: None,
        }
    }

    pub fn returning_to(mut self, path: impl Into<String>) -> Self {
        self.return_to = Some(path.into());
        self
    }

    /// Label for the save toggle button.
    pub fn save_label(&self) -> &'static str {
        if self.saved { "Unsave" } else { "Save" }
    }
}

/// One step of a route, formatted for the timeline.
#[derive(Debug, Clone)]
pub struct StepView {
    pub kind: &'static str,
    pub css_class: &'static str,
    pub description: String,
    pub duration: String,
    pub distance: String,
    pub bus: Option<String>,
}

impl StepView {
    pub fn from_step(step: &RouteStep) -> Self {
        let css_class = match step.kind {
            StepKind::Walk => "step-walk",
            StepKind::Bus => "step-bus",
            StepKind::Metro => "step-metro",
            StepKind::Wait => "step-wait",
        };

        let bus = match (&step.bus_number, &step.bus_name) {
            (Some(number), Some(name)) => Some(format!("{number} ({name})")),
            (Some(number), None) => Some(number.clone()),
            (None, Some(name)) => Some(name.clone()),
            (None, None) => None,
        };

        Self {
            kind: step.kind.label(),
            css_class,
            description: step.description.clone(),
            duration: format_duration(step.duration),
            distance: format_optional_distance(step.distance),
            bus,
        }
    }
}

/// A remembered search.
#[derive(Debug, Clone)]
pub struct RecentSearchView {
    pub origin: String,
    pub destination: String,
    pub searched_at: String,
}

impl RecentSearchView {
    pub fn from_query(query: &SearchQuery) -> Self {
        let searched_at = Utc
            .timestamp_millis_opt(query.timestamp)
            .single()
            .map(|t| t.format("%d %b %H:%M").to_string())
            .unwrap_or_default();

        Self {
            origin: query.origin.clone(),
            destination: query.destination.clone(),
            searched_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CURRENT_LOCATION, POPULAR_DESTINATIONS, fixtures::route};

    #[test]
    fn route_card_formats_fields() {
        let card = RouteCardView::from_route(&route("r1"), true);
        assert_eq!(card.duration, "35m");
        assert_eq!(card.distance, "8.2 km");
        assert_eq!(card.fare, "Rs. 60");
        assert_eq!(card.save_label(), "Unsave");
    }

    #[test]
    fn step_view_bus_label() {
        let r = route("r1");
        let walk = StepView::from_step(&r.steps[0]);
        assert_eq!(walk.kind, "Walk");
        assert_eq!(walk.distance, "350 m");
        assert!(walk.bus.is_none());

        let bus = StepView::from_step(&r.steps[1]);
        assert_eq!(bus.css_class, "step-bus");
        assert_eq!(bus.bus.as_deref(), Some("FR-14 (Feeder Route 14)"));
        assert_eq!(bus.distance, "");
    }

    #[test]
    fn recent_search_time() {
        let q = SearchQuery::new("A", "B", 1_700_000_000_000).unwrap();
        let view = RecentSearchView::from_query(&q);
        assert_eq!(view.searched_at, "14 Nov 22:13");
    }

    #[test]
    fn home_renders_saved_and_recent() {
        let template = HomeTemplate {
            recent_searches: vec![RecentSearchView::from_query(
                &SearchQuery::new("Gulberg", "Anarkali", 0).unwrap(),
            )],
            saved_routes: vec![RouteCardView::from_route(&route("r1"), true).returning_to("/")],
            popular_destinations: POPULAR_DESTINATIONS.to_vec(),
            current_location: CURRENT_LOCATION,
        };
        let html = template.render().unwrap();
        assert!(html.contains("Gulberg"));
        assert!(html.contains("Route r1"));
        assert!(html.contains("/routes/r1/save?return_to=%2F"));
        assert!(html.contains(
            "/results?origin=Current%20Location&amp;destination=Faisal%20Mosque&amp;record=false"
        ));
    }
}
