//! Typed errors for the extraction library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Why a single strategy could not produce turns.
///
/// Cloneable so a memoized page fetch can hand the same failure to
/// every strategy that reads it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum StrategyFailure {
    /// The strategy exceeded its own timeout
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The link does not resolve to a readable conversation (404, private, deleted)
    #[error("not found: {0}")]
    NotFound(String),

    /// The resource was fetched but yielded no usable turns
    #[error("malformed content: {0}")]
    MalformedContent(String),

    /// Transport failure or unexpected HTTP status
    #[error("unavailable: {0}")]
    Unavailable(String),
}

/// One failed strategy in an extraction attempt.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyAttempt {
    pub strategy: String,
    pub failure: StrategyFailure,
}

/// Errors returned by [`crate::ConversationExtractor`].
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Every strategy in the chain failed
    #[error("all {} extraction strategies failed for {url}: {}", failures.len(), summarize(failures))]
    AllStrategiesFailed {
        url: String,
        failures: Vec<StrategyAttempt>,
    },

    /// The extractor was built without strategies
    #[error("no extraction strategies configured")]
    NoStrategies,

    /// An HTTP client could not be constructed
    #[error("http client setup failed: {0}")]
    ClientSetup(String),
}

impl ExtractionError {
    /// True when every strategy reported the link as missing or private.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::AllStrategiesFailed { failures, .. } => {
                !failures.is_empty()
                    && failures
                        .iter()
                        .all(|a| matches!(a.failure, StrategyFailure::NotFound(_)))
            }
            Self::NoStrategies | Self::ClientSetup(_) => false,
        }
    }
}

fn summarize(failures: &[StrategyAttempt]) -> String {
    failures
        .iter()
        .map(|a| format!("{}: {}", a.strategy, a.failure))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Result type alias for a single strategy or fetch.
pub type StrategyResult<T> = std::result::Result<T, StrategyFailure>;
