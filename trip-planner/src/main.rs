use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use trip_planner::config::ServerConfig;
use trip_planner::dataset::RouteDataset;
use trip_planner::storage::{FileStorage, FileStorageConfig};
use trip_planner::store::{RouteStore, StoreConfig};
use trip_planner::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("trip_planner=info")),
        )
        .init();

    if let Err(message) = run().await {
        error!("{message}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let config = ServerConfig::from_env().map_err(|e| e.to_string())?;

    // Load the route dataset
    let dataset = match &config.dataset_path {
        Some(path) => RouteDataset::load(path),
        None => RouteDataset::bundled(),
    }
    .map_err(|e| format!("Failed to load route dataset: {e}"))?;
    info!(routes = dataset.len(), "loaded route dataset");

    // Open the persistent store
    let storage = FileStorage::new(FileStorageConfig::new(config.storage_dir.clone()));
    let store = RouteStore::open(Arc::new(storage), StoreConfig::default()).await;
    info!(
        saved_routes = store.saved_routes().len(),
        recent_searches = store.recent_searches().len(),
        storage_dir = %config.storage_dir.display(),
        "opened route store"
    );

    let state = AppState::new(store.clone(), dataset);
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {e}", config.addr))?;
    info!("Trip planner listening on http://{}", config.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {e}"))?;

    // Make sure the last mutation reaches storage before exiting
    if let Err(e) = store.flush().await {
        warn!(error = %e, "failed to persist route state on shutdown");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
