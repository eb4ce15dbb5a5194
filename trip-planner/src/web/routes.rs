//! HTTP route handlers.

use std::path::Path;

use askama::Template;
use axum::{
    Json, Router,
    extract::{Path as UrlPath, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tracing::{debug, warn};

use crate::domain::{
    CURRENT_LOCATION, DomainError, POPULAR_DESTINATIONS, RouteExtent, SearchQuery,
};

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(home_page))
        .route("/health", get(health))
        .route("/results", get(search_results))
        .route("/routes/:id", get(route_detail))
        .route("/routes/:id/save", post(toggle_saved))
        .route("/recent/clear", post(clear_recent))
        .route("/api/state", get(current_state))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

fn render(template: &impl Template) -> Result<Response, AppError> {
    let html = template.render().map_err(|e| AppError::Internal {
        message: format!("Template error: {}", e),
    })?;
    Ok(Html(html).into_response())
}

/// Home page with search form, recent searches, suggestions and saved routes.
async fn home_page(State(state): State<AppState>) -> Result<Response, AppError> {
    let template = HomeTemplate {
        recent_searches: state
            .store
            .recent_searches()
            .iter()
            .map(RecentSearchView::from_query)
            .collect(),
        saved_routes: state
            .store
            .saved_routes()
            .iter()
            .map(|r| RouteCardView::from_route(r, true).returning_to("/"))
            .collect(),
        popular_destinations: POPULAR_DESTINATIONS.to_vec(),
        current_location: CURRENT_LOCATION,
    };
    render(&template)
}

/// List the available routes, recording the search unless asked not to.
async fn search_results(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(req): Query<SearchRequest>,
) -> Result<Response, AppError> {
    let query = SearchQuery::now(&req.origin, &req.destination)?;
    if req.record {
        state.store.add_recent_search(query.clone());
        debug!(origin = %query.origin, destination = %query.destination, "recorded search");
    }

    let routes = state.dataset.routes();

    if accepts_html(&headers) {
        let template = ResultsTemplate {
            origin: query.origin,
            destination: query.destination,
            routes: routes
                .iter()
                .map(|r| RouteCardView::from_route(r, state.store.is_saved(r.id.as_str())))
                .collect(),
        };
        render(&template)
    } else {
        let routes = routes
            .iter()
            .map(|r| RouteResult {
                saved: state.store.is_saved(r.id.as_str()),
                route: r.clone(),
            })
            .collect();

        Ok(Json(SearchResponse { query, routes }).into_response())
    }
}

/// Route details with formatted steps.
async fn route_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<String>,
) -> Result<Response, AppError> {
    let route = state.find_route(&id).ok_or_else(|| AppError::NotFound {
        message: format!("Route {} not found", id),
    })?;
    let saved = state.store.is_saved(&id);
    let extent = RouteExtent::for_route(&route);

    if accepts_html(&headers) {
        let template = RouteDetailTemplate {
            route: RouteCardView::from_route(&route, saved),
            steps: route.steps.iter().map(StepView::from_step).collect(),
            extent,
        };
        render(&template)
    } else {
        Ok(Json(RouteDetailResponse {
            route,
            saved,
            extent,
        })
        .into_response())
    }
}

/// Save a route, or unsave it if it is already saved.
async fn toggle_saved(
    State(state): State<AppState>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<String>,
    Query(params): Query<SaveParams>,
) -> Result<Response, AppError> {
    let route = state.find_route(&id).ok_or_else(|| AppError::NotFound {
        message: format!("Route {} not found", id),
    })?;
    let saved = state.store.toggle_saved_route(&route);
    debug!(route = %id, saved, "toggled saved route");

    if accepts_html(&headers) {
        let target = params
            .return_to
            .filter(|path| is_local_path(path))
            .unwrap_or_else(|| format!("/routes/{}", id));
        Ok(Redirect::to(&target).into_response())
    } else {
        Ok(Json(SaveResponse { id, saved }).into_response())
    }
}

/// Only same-site absolute paths are followed after a form post.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}

/// Forget all recent searches.
async fn clear_recent(State(state): State<AppState>, headers: HeaderMap) -> Response {
    state.store.clear_recent_searches();

    if accepts_html(&headers) {
        Redirect::to("/").into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

/// Saved routes and recent searches as JSON.
async fn current_state(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.snapshot())
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!(%status, "{message}");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RouteDataset;
    use crate::store::RouteStore;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn app() -> (Router, AppState) {
        let state = AppState::new(
            RouteStore::in_memory().await,
            RouteDataset::bundled().unwrap(),
        );
        (create_router(state.clone(), "static"), state)
    }

    fn get_json(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .unwrap()
    }

    fn get_html(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::ACCEPT, "text/html")
            .body(Body::empty())
            .unwrap()
    }

    fn post(uri: &str, accept: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::ACCEPT, accept)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_str(&body_string(response).await).unwrap()
    }

    #[tokio::test]
    async fn health_check() {
        let (app, _) = app().await;
        let response = app.oneshot(get_json("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "ok");
    }

    #[tokio::test]
    async fn search_records_recent_and_lists_dataset() {
        let (app, state) = app().await;

        let response = app
            .oneshot(get_json("/results?origin=%20Liberty%20&destination=Anarkali"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["query"]["origin"], "Liberty");
        assert_eq!(
            json["routes"].as_array().unwrap().len(),
            state.dataset.len()
        );
        assert_eq!(json["routes"][0]["saved"], false);

        let recent = state.store.recent_searches();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].origin, "Liberty");
        assert_eq!(recent[0].destination, "Anarkali");
    }

    #[tokio::test]
    async fn blank_search_is_rejected() {
        let (app, state) = app().await;

        let response = app
            .oneshot(get_json("/results?origin=&destination=Anarkali"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "origin must not be empty"
        );
        assert!(state.store.recent_searches().is_empty());
    }

    #[tokio::test]
    async fn toggle_saves_then_unsaves() {
        let (app, state) = app().await;

        let response = app
            .clone()
            .oneshot(post("/routes/r1/save", "application/json"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["id"], "r1");
        assert_eq!(json["saved"], true);
        assert!(state.store.is_saved("r1"));

        let response = app
            .oneshot(post("/routes/r1/save", "application/json"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["saved"], false);
        assert!(!state.store.is_saved("r1"));
    }

    #[tokio::test]
    async fn toggle_from_form_redirects_to_detail() {
        let (app, _) = app().await;

        let response = app
            .oneshot(post("/routes/r2/save", "text/html"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/routes/r2");
    }

    #[tokio::test]
    async fn toggle_from_home_returns_home() {
        let (app, state) = app().await;
        state.store.add_saved_route(state.dataset.get("r2").unwrap().clone());

        let response = app
            .oneshot(post("/routes/r2/save?return_to=%2F", "text/html"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
        assert!(!state.store.is_saved("r2"));
    }

    #[tokio::test]
    async fn toggle_ignores_offsite_return() {
        let (app, _) = app().await;

        let response = app
            .oneshot(post(
                "/routes/r2/save?return_to=%2F%2Fevil.example",
                "text/html",
            ))
            .await
            .unwrap();
        assert_eq!(response.headers()[header::LOCATION], "/routes/r2");
    }

    #[test]
    fn local_paths() {
        assert!(is_local_path("/"));
        assert!(is_local_path("/routes/r1"));
        assert!(!is_local_path("//evil.example"));
        assert!(!is_local_path("https://evil.example"));
        assert!(!is_local_path("/\\evil.example"));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (app, _) = app().await;

        let response = app
            .clone()
            .oneshot(get_json("/routes/nope"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(post("/routes/nope/save", "application/json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn detail_page_shows_formatted_steps() {
        let (app, state) = app().await;
        let route = state.dataset.get("r1").unwrap().clone();

        let response = app.oneshot(get_html("/routes/r1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(html.contains(&route.name));
        assert!(html.contains("38m"));
        assert!(html.contains("9.4 km"));
        assert!(html.contains("class=\"map\""));
    }

    #[tokio::test]
    async fn detail_json_includes_extent() {
        let (app, _) = app().await;

        let response = app.oneshot(get_json("/routes/r1")).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json["route"]["id"], "r1");
        assert_eq!(json["saved"], false);
        assert!(json["extent"]["latitudeDelta"].as_f64().unwrap() >= 0.02);
    }

    #[tokio::test]
    async fn saved_route_outside_dataset_is_still_viewable() {
        let (app, state) = app().await;
        state
            .store
            .add_saved_route(crate::domain::fixtures::route("retired"));

        let response = app.oneshot(get_json("/routes/retired")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["saved"], true);
    }

    #[tokio::test]
    async fn home_lists_saved_routes_and_recent_searches() {
        let (app, state) = app().await;
        let route = state.dataset.get("r3").unwrap().clone();
        state.store.add_saved_route(route.clone());
        state
            .store
            .add_recent_search(SearchQuery::new("Gulberg", "Anarkali", 0).unwrap());

        let response = app.oneshot(get_html("/")).await.unwrap();
        let html = body_string(response).await;
        assert!(html.contains(&route.name));
        assert!(html.contains("Recent Searches"));
        assert!(html.contains("Gulberg"));
    }

    #[tokio::test]
    async fn home_lists_popular_destinations() {
        let (app, _) = app().await;

        let response = app.oneshot(get_html("/")).await.unwrap();
        let html = body_string(response).await;
        assert!(html.contains("Popular Destinations"));
        for dest in POPULAR_DESTINATIONS {
            assert!(html.contains(dest.name), "missing {}", dest.name);
        }
        assert!(html.contains(
            "/results?origin=Current%20Location&amp;destination=Bahria%20Town&amp;record=false"
        ));
    }

    #[tokio::test]
    async fn suggested_search_is_not_recorded() {
        let (app, state) = app().await;

        let response = app
            .oneshot(get_json(
                "/results?origin=Current%20Location&destination=Faisal%20Mosque&record=false",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["query"]["origin"], CURRENT_LOCATION);
        assert_eq!(json["query"]["destination"], "Faisal Mosque");
        assert!(state.store.recent_searches().is_empty());
    }

    #[tokio::test]
    async fn clear_recent_searches() {
        let (app, state) = app().await;
        state
            .store
            .add_recent_search(SearchQuery::new("A", "B", 0).unwrap());

        let response = app
            .oneshot(post("/recent/clear", "application/json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(state.store.recent_searches().is_empty());
    }

    #[tokio::test]
    async fn state_endpoint_uses_persisted_field_names() {
        let (app, state) = app().await;
        state.store.add_saved_route(state.dataset.get("r1").unwrap().clone());

        let response = app.oneshot(get_json("/api/state")).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json["savedRoutes"][0]["id"], "r1");
        assert!(json["recentSearches"].as_array().unwrap().is_empty());
    }
}
