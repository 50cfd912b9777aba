//! Error types for materialization and code generation

use reqforge_llm::LlmError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while generating or writing a project.
///
/// Parsing never fails; only the filesystem and the completion service can.
#[derive(Error, Debug)]
pub enum MaterializeError {
    /// Filesystem operation failed
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// Path being written or created
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// No credential configured for the completion service
    #[error("No API key configured for the completion service")]
    AuthenticationMissing,

    /// Completion service failed during generation
    #[error("Completion service error: {0}")]
    TransientService(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MaterializeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MaterializeError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<LlmError> for MaterializeError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::AuthenticationMissing => MaterializeError::AuthenticationMissing,
            other => MaterializeError::TransientService(other.to_string()),
        }
    }
}
