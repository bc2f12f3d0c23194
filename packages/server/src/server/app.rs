//! Application setup and router configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::pipeline::PipelineController;
use crate::kernel::ServerDeps;
use crate::server::routes::{
    conversation_handler, health_handler, insight_handler, list_insights_handler, start_handler,
    status_handler, stop_handler, test_link_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<PipelineController>,
    pub deps: ServerDeps,
}

impl AppState {
    pub fn new(controller: Arc<PipelineController>, deps: ServerDeps) -> Self {
        Self { controller, deps }
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    Router::new()
        // Pipeline control
        .route("/start", post(start_handler))
        .route("/stop", post(stop_handler))
        .route("/status", get(status_handler))
        // Artifacts
        .route("/insights", get(list_insights_handler))
        .route("/insights/:id", get(insight_handler))
        .route("/conversations/:id", get(conversation_handler))
        // Diagnostics
        .route("/health", get(health_handler))
        .route("/debug/test-link", get(test_link_handler))
        .layer(Extension(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
