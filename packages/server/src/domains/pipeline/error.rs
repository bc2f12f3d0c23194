use extraction::ExtractionError;
use thiserror::Error;

use crate::domains::artifacts::StoreError;
use crate::domains::insights::InsightError;
use crate::domains::links::LinkGenerationError;
use crate::kernel::ModelError;

/// Why an iteration did not fully succeed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("model service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("model request failed: {0}")]
    ModelRequest(String),

    #[error("no valid link after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },

    #[error("extraction failed: {0}")]
    ExtractionFailed(#[from] ExtractionError),

    #[error("insight malformed: {reason}")]
    InsightMalformed { reason: String },

    #[error("artifact write failed: {0}")]
    StoreWriteFailed(#[from] StoreError),
}

impl From<ModelError> for PipelineError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::ServiceUnavailable(msg) => Self::ServiceUnavailable(msg),
            ModelError::ModelUnavailable(msg) => Self::ModelUnavailable(msg),
            ModelError::Request(msg) => Self::ModelRequest(msg),
        }
    }
}

impl From<LinkGenerationError> for PipelineError {
    fn from(e: LinkGenerationError) -> Self {
        match e {
            LinkGenerationError::Model(e) => e.into(),
            LinkGenerationError::Exhausted { attempts } => Self::GenerationExhausted { attempts },
        }
    }
}

impl From<InsightError> for PipelineError {
    fn from(e: InsightError) -> Self {
        match e {
            InsightError::Model(e) => e.into(),
            InsightError::Malformed { reason } => Self::InsightMalformed { reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_errors_map_by_kind() {
        let e: PipelineError = ModelError::ServiceUnavailable("down".into()).into();
        assert!(matches!(e, PipelineError::ServiceUnavailable(_)));

        let e: PipelineError = LinkGenerationError::Exhausted { attempts: 5 }.into();
        assert_eq!(e.to_string(), "no valid link after 5 attempts");

        let e: PipelineError = InsightError::Malformed { reason: "bad".into() }.into();
        assert!(matches!(e, PipelineError::InsightMalformed { .. }));
    }
}
