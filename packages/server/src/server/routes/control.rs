use axum::{extract::Extension, http::StatusCode, Json};

use crate::domains::pipeline::{ControlOutcome, PipelineState};
use crate::server::app::AppState;

/// Start the pipeline. 409 when it is already running or still stopping.
pub async fn start_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<ControlOutcome>) {
    let outcome = state.controller.start();
    let status = if outcome.accepted {
        StatusCode::OK
    } else {
        StatusCode::CONFLICT
    };
    (status, Json(outcome))
}

pub async fn stop_handler(Extension(state): Extension<AppState>) -> Json<ControlOutcome> {
    Json(state.controller.stop())
}

pub async fn status_handler(Extension(state): Extension<AppState>) -> Json<PipelineState> {
    Json(state.controller.status())
}
