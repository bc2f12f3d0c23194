//! Insight synthesis: one model call, one corrective retry.

use std::time::Duration;

use chrono::Utc;
use extraction::Conversation;
use thiserror::Error;
use tracing::{info, warn};

use super::models::InsightRecord;
use super::parse::parse_insight;
use super::prompts::{corrective_prompt, insight_prompt, SYSTEM_PROMPT};
use crate::kernel::{BaseModelGateway, CompletionOptions, ModelError};

const INSIGHT_TIMEOUT: Duration = Duration::from_secs(180);
const MAX_REPLY_TOKENS: u32 = 1024;

#[derive(Debug, Error)]
pub enum InsightError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("model reply did not match the insight schema: {reason}")]
    Malformed { reason: String },
}

fn options() -> CompletionOptions {
    CompletionOptions::new()
        .with_system(SYSTEM_PROMPT)
        .with_temperature(0.2)
        .with_max_tokens(MAX_REPLY_TOKENS)
        .with_timeout(INSIGHT_TIMEOUT)
}

/// Summarize a conversation into an [`InsightRecord`].
///
/// A reply that fails to parse gets exactly one corrective retry.
pub async fn summarize(
    gateway: &dyn BaseModelGateway,
    conversation: &Conversation,
) -> Result<InsightRecord, InsightError> {
    let options = options();

    let reply = gateway
        .complete(&insight_prompt(conversation), &options)
        .await?;

    let reason = match parse_insight(&reply, Utc::now()) {
        Ok(record) => {
            info!(topic = %record.main_topic, "Insight synthesized");
            return Ok(record);
        }
        Err(reason) => reason,
    };

    warn!(reason = %reason, "Insight reply malformed, retrying with correction");
    let retry = gateway
        .complete(&corrective_prompt(conversation, &reason, &reply), &options)
        .await?;

    match parse_insight(&retry, Utc::now()) {
        Ok(record) => {
            info!(topic = %record.main_topic, "Insight synthesized after correction");
            Ok(record)
        }
        Err(reason) => Err(InsightError::Malformed { reason }),
    }
}
