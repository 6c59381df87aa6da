//! KEH Tech Audit Tool Backend
//!
//! REST backend that keeps project audit records and tech-stack autocomplete
//! tags as JSON documents in an object-storage bucket.

mod api;
mod config;
mod db;
mod errors;
mod models;
mod storage;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::{ProjectRepository, TagRegistry};
use storage::{BlobStore, DocumentStore, BUCKET};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub projects: Arc<ProjectRepository>,
    pub tags: Arc<TagRegistry>,
}

impl AppState {
    /// Wire the repositories to a blob store.
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        let documents = DocumentStore::new(blobs);
        let tags = Arc::new(TagRegistry::new(documents.clone()));
        let projects = Arc::new(ProjectRepository::new(documents, tags.clone()));
        Self { projects, tags }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting KEH Tech Audit Tool Backend");
    tracing::info!("Bucket: {}", BUCKET);
    tracing::info!("Store backend: {:?}", config.store_backend);
    tracing::info!("Bind address: {}", config.bind_addr);

    match &config.region {
        Some(region) => tracing::info!("Storage region: {}", region),
        None => {
            tracing::warn!("No storage region configured (AUDIT_REGION or AWS_DEFAULT_REGION)")
        }
    }

    let blobs = db::init_store(&config).await?;
    let state = AppState::new(blobs);

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Projects
        .route(
            "/projects",
            get(api::list_projects).post(api::create_project),
        )
        .route("/projects/{name}", get(api::get_project))
        // Autocomplete
        .route("/autocomplete", get(api::autocomplete));

    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home() -> &'static str {
    "Welcome to the KEH Tech Audit Tool API!"
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
