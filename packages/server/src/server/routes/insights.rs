use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use extraction::Conversation;
use tracing::error;

use super::{api_error, ApiError};
use crate::domains::artifacts::StoredInsight;
use crate::domains::insights::InsightRecord;
use crate::server::app::AppState;

/// Summaries of every stored insight, newest first
pub async fn list_insights_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<StoredInsight>>, ApiError> {
    state.deps.store.list_insights().map(Json).map_err(|e| {
        error!(error = %e, "Failed to list insights");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to list insights")
    })
}

pub async fn insight_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InsightRecord>, ApiError> {
    match state.deps.store.load_insight(&id) {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err(api_error(StatusCode::NOT_FOUND, format!("insight {} not found", id))),
        Err(e) => {
            error!(id = %id, error = %e, "Failed to load insight");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to load insight"))
        }
    }
}

pub async fn conversation_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    match state.deps.store.load_conversation(&id) {
        Ok(Some(conversation)) => Ok(Json(conversation)),
        Ok(None) => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("conversation {} not found", id),
        )),
        Err(e) => {
            error!(id = %id, error = %e, "Failed to load conversation");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to load conversation"))
        }
    }
}
