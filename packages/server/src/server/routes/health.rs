use std::time::Duration;

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::domains::pipeline::RunState;
use crate::server::app::AppState;

const READY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    model_service: ModelServiceHealth,
    pipeline: RunState,
}

#[derive(Serialize)]
pub struct ModelServiceHealth {
    status: String,
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// Checks the model service (bounded to 5s). Returns 200 OK when it answers,
/// 503 Service Unavailable otherwise. Never touches pipeline state.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let gateway = &state.deps.gateway;
    let error = match tokio::time::timeout(READY_TIMEOUT, gateway.ensure_ready()).await {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e.to_string()),
        Err(_) => Some("Model service readiness check timeout (>5s)".to_string()),
    };

    let is_healthy = error.is_none();
    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            model_service: ModelServiceHealth {
                status: if is_healthy { "ok" } else { "error" }.to_string(),
                model: gateway.model_name().to_string(),
                error,
            },
            pipeline: state.controller.status().run_state,
        }),
    )
}
