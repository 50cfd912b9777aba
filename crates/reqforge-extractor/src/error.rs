//! Error types for the Extractor

use reqforge_llm::LlmError;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractorError {
    /// No credential configured for the completion service
    #[error("No API key configured for the completion service")]
    AuthenticationMissing,

    /// Completion service unreachable, rejected the call or was rate limited
    #[error("Completion service error: {0}")]
    TransientService(String),

    /// Model output could not be parsed as a record array
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Every strategy finished without producing a single record
    #[error("No functionality found in document")]
    NoFunctionalityFound,

    /// Document bytes could not be decoded as the declared content type
    #[error("Document read error: {0}")]
    DocumentRead(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    /// Whether a caller might succeed by retrying the same document
    pub fn is_transient(&self) -> bool {
        matches!(self, ExtractorError::TransientService(_))
    }
}

impl From<LlmError> for ExtractorError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::AuthenticationMissing => ExtractorError::AuthenticationMissing,
            other => ExtractorError::TransientService(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::MalformedResponse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_classification() {
        assert_eq!(
            ExtractorError::from(LlmError::AuthenticationMissing),
            ExtractorError::AuthenticationMissing
        );

        let rate_limited = ExtractorError::from(LlmError::RateLimitExceeded);
        assert!(rate_limited.is_transient());

        let rejected = ExtractorError::from(LlmError::Authentication("HTTP 401".to_string()));
        assert!(rejected.is_transient());
    }
}
