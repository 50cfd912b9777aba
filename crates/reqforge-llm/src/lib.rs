//! reqforge LLM Provider Layer
//!
//! The completion/embedding collaborator behind every pipeline stage.
//!
//! # Architecture
//!
//! Pipeline crates are generic over [`LlmProvider`]. The collaborator is
//! treated as an opaque, failure-prone function: one attempt per call, no
//! retry policy. Timeouts are the provider's concern and surface as
//! [`LlmError::Communication`].
//!
//! # Providers
//!
//! - `MockProvider`: Scripted, deterministic provider for testing
//! - `OpenAiProvider`: OpenAI-compatible chat completion and embedding API
//!
//! # Examples
//!
//! ```
//! use reqforge_llm::{CompletionOptions, LlmProvider, MockProvider};
//!
//! # async fn example() -> Result<(), reqforge_llm::LlmError> {
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.complete("test prompt", &CompletionOptions::default()).await?;
//! assert_eq!(result, "Hello from LLM!");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use mock::MockProvider;
pub use openai::{OpenAiConfig, OpenAiProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// No credential configured; raised before any network call
    #[error("API key not configured")]
    AuthenticationMissing,

    /// Credential rejected by the service
    #[error("Authentication rejected: {0}")]
    Authentication(String),

    /// Network or API communication error (including timeouts)
    #[error("Communication error: {0}")]
    Communication(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),
}

impl LlmError {
    /// Whether the error is the missing-credential pre-flight failure
    pub fn is_authentication_missing(&self) -> bool {
        matches!(self, LlmError::AuthenticationMissing)
    }
}

/// Per-call completion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Optional system message sent ahead of the prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl CompletionOptions {
    /// Set the system message
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            system_prompt: None,
            temperature: 0.3,
            max_tokens: 4000,
        }
    }
}

/// Completion and embedding collaborator
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Pre-flight check that a credential is available.
    ///
    /// Must not touch the network.
    fn check_credentials(&self) -> Result<(), LlmError> {
        Ok(())
    }

    /// Generate a completion for `prompt`
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String, LlmError>;

    /// Compute an embedding vector for `text`
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError>;

    /// Name of the completion model, for logs and reports
    fn model_name(&self) -> &str;
}
