//! Error types for the Ollama client.

use thiserror::Error;

/// Result type for Ollama client operations.
pub type Result<T> = std::result::Result<T, OllamaError>;

/// Ollama client errors.
#[derive(Debug, Error)]
pub enum OllamaError {
    /// Configuration error (invalid base URL, client construction)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The service could not be reached at all
    #[error("Connection error: {0}")]
    Connection(String),

    /// The request did not finish within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// API error (non-2xx response)
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl OllamaError {
    /// Whether the error means the service itself is unreachable.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Whether the service answered that the requested model does not exist.
    pub fn is_model_missing(&self) -> bool {
        match self {
            Self::Api { status, body } => {
                *status == 404 || body.to_lowercase().contains("not found")
            }
            _ => false,
        }
    }

    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_connect() {
            Self::Connection(e.to_string())
        } else if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Connection(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_missing_detection() {
        let err = OllamaError::Api {
            status: 404,
            body: "model 'llama3' not found".into(),
        };
        assert!(err.is_model_missing());
        assert!(!err.is_unreachable());

        let err = OllamaError::Api {
            status: 500,
            body: "out of memory".into(),
        };
        assert!(!err.is_model_missing());
    }

    #[test]
    fn test_unreachable_detection() {
        assert!(OllamaError::Connection("refused".into()).is_unreachable());
        assert!(!OllamaError::Timeout("slow".into()).is_unreachable());
    }
}
