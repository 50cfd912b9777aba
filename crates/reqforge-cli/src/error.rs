//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Completion service setup or call failed
    #[error("LLM error: {0}")]
    Llm(#[from] reqforge_llm::LlmError),

    /// Extraction failed
    #[error("Extraction error: {0}")]
    Extractor(#[from] reqforge_extractor::ExtractorError),

    /// Generation or materialization failed
    #[error("Materialization error: {0}")]
    Materialize(#[from] reqforge_materializer::MaterializeError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No functionality matches the requested name
    #[error("No functionality matching '{0}'")]
    NotFound(String),

    /// Nothing ingested yet
    #[error("No document loaded. Use 'ingest <file>' first.")]
    NoSession,
}
