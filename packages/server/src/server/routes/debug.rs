use axum::extract::{Extension, Query};
use axum::Json;
use extraction::{ConversationTurn, ExtractionError, StrategyAttempt};
use serde::{Deserialize, Serialize};

use crate::domains::links::is_valid_share_link;
use crate::server::app::AppState;

#[derive(Deserialize)]
pub struct TestLinkParams {
    pub url: String,
}

#[derive(Serialize)]
pub struct TestLinkResponse {
    url: String,
    valid_share_link: bool,
    extracted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    strategy: Option<String>,
    turns: Vec<ConversationTurn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    failures: Vec<StrategyAttempt>,
}

/// Run one extraction against `url` without persisting anything.
///
/// Not serialized with the pipeline worker. While the pipeline is running this
/// call can overlap an iteration and add load on the render service. Counters
/// and stored artifacts are never touched.
pub async fn test_link_handler(
    Extension(state): Extension<AppState>,
    Query(params): Query<TestLinkParams>,
) -> Json<TestLinkResponse> {
    let url = params.url.trim().to_string();
    let valid_share_link = is_valid_share_link(&url);

    let mut response = TestLinkResponse {
        url: url.clone(),
        valid_share_link,
        extracted: false,
        strategy: None,
        turns: Vec::new(),
        error: None,
        failures: Vec::new(),
    };

    match state.deps.extractor.extract(&url).await {
        Ok(conversation) => {
            response.extracted = true;
            response.strategy = Some(conversation.extraction_method);
            response.turns = conversation.turns;
        }
        Err(e) => {
            response.error = Some(e.to_string());
            if let ExtractionError::AllStrategiesFailed { failures, .. } = e {
                response.failures = failures;
            }
        }
    }

    Json(response)
}
