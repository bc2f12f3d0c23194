//! Link synthesis activities.
//!
//! Asks the model for one share-link per call. A reply that does not match
//! the grammar is a normal outcome (`valid = false`), not an error.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use super::grammar::{extract_candidate, is_valid_share_link};
use super::models::{CandidateLink, LinkTally};
use crate::kernel::{BaseModelGateway, CompletionOptions, ModelError};

const SYSTEM_PROMPT: &str =
    "You generate ChatGPT share links. Reply with exactly one URL and nothing else.";

const LINK_PROMPT: &str = "Produce one plausible ChatGPT shared-conversation link.\n\
The link must have the form https://chatgpt.com/share/<uuid> where <uuid> is a \
random version-4 UUID written as 8-4-4-4-12 lowercase hexadecimal digits.\n\
Reply with the link only.";

/// Replies are one URL; anything longer is the model rambling.
const MAX_REPLY_TOKENS: u32 = 96;
const LINK_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum LinkGenerationError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("no valid link after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// Ask the model for one candidate link.
pub async fn generate(gateway: &dyn BaseModelGateway) -> Result<CandidateLink, ModelError> {
    let options = CompletionOptions::new()
        .with_system(SYSTEM_PROMPT)
        .with_temperature(1.0)
        .with_max_tokens(MAX_REPLY_TOKENS)
        .with_timeout(LINK_TIMEOUT);

    let raw_output = gateway.complete(LINK_PROMPT, &options).await?;
    let url = extract_candidate(&raw_output).unwrap_or_default();
    let valid = is_valid_share_link(&url);

    debug!(url = %url, valid, "Link candidate");
    Ok(CandidateLink {
        url,
        valid,
        raw_output,
    })
}

/// Generate until a valid link appears or `max_attempts` calls are spent.
///
/// Every attempt is counted in `tally`, including the failing ones. Model
/// errors abort immediately: retrying a dead service burns the budget for nothing.
pub async fn generate_valid(
    gateway: &dyn BaseModelGateway,
    max_attempts: u32,
    tally: &mut LinkTally,
) -> Result<CandidateLink, LinkGenerationError> {
    for attempt in 1..=max_attempts {
        let candidate = generate(gateway).await?;
        tally.generated += 1;

        if candidate.valid {
            info!(url = %candidate.url, attempt, "Generated valid link");
            return Ok(candidate);
        }

        tally.invalid += 1;
        debug!(
            attempt,
            max_attempts,
            raw_output = %ollama_client::truncate_to_char_boundary(&candidate.raw_output, 200),
            "Model produced an invalid link"
        );
    }

    Err(LinkGenerationError::Exhausted {
        attempts: max_attempts,
    })
}
