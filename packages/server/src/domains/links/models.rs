use serde::{Deserialize, Serialize};

/// One link proposed by the model.
///
/// Consumed once by the pipeline; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateLink {
    /// Normalized candidate (empty when the reply had no URL-shaped token)
    pub url: String,
    /// Whether `url` conforms to the share-link grammar
    pub valid: bool,
    /// The model reply the candidate was taken from
    pub raw_output: String,
}

/// Attempt counts from one `generate_valid` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkTally {
    pub generated: u64,
    pub invalid: u64,
}
