//! OpenAI Provider Implementation
//!
//! Chat completions and embeddings against an OpenAI-compatible HTTP API.
//!
//! # Features
//!
//! - Async HTTP communication via reqwest
//! - Configurable base URL, models and timeout
//! - Credential pre-flight without network access
//! - Status codes mapped onto [`LlmError`] categories
//!
//! Each call is a single attempt. Callers that want retries wrap the
//! provider themselves.
//!
//! # Examples
//!
//! ```no_run
//! use reqforge_llm::{OpenAiConfig, OpenAiProvider};
//!
//! let config = OpenAiConfig {
//!     api_key: Some("sk-...".to_string()),
//!     ..OpenAiConfig::default()
//! };
//! let provider = OpenAiProvider::new(config).unwrap();
//! ```

use crate::{CompletionOptions, LlmError, LlmProvider};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat completion model
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default timeout for LLM requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for [`OpenAiProvider`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API base URL, without trailing slash
    pub base_url: String,

    /// Model used for chat completions
    pub chat_model: String,

    /// Model used for embeddings
    pub embedding_model: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Bearer credential
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

impl OpenAiConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url must not be empty".to_string());
        }
        if self.chat_model.trim().is_empty() {
            return Err("chat_model must not be empty".to_string());
        }
        if self.embedding_model.trim().is_empty() {
            return Err("embedding_model must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// OpenAI-compatible provider
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiProvider {
    /// Create a provider from configuration
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Communication`] if the HTTP client cannot be built.
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Provider configuration
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        match self.config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(LlmError::AuthenticationMissing),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post<B, R>(&self, path: &str, body: &B, model: &str) -> Result<R, LlmError>
    where
        B: Serialize + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let key = self.api_key()?;
        let url = self.url(path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("LLM request to {} failed with HTTP {}", path, status);
            return Err(classify_status(status, error_text, model));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

fn classify_status(status: StatusCode, body: String, model: &str) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LlmError::Authentication(format!("HTTP {}: {}", status, body))
        }
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
        StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(model.to_string()),
        _ => LlmError::Communication(format!("HTTP {}: {}", status, body)),
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn check_credentials(&self) -> Result<(), LlmError> {
        self.api_key().map(|_| ())
    }

    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = options.system_prompt.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let request = ChatRequest {
            model: &self.config.chat_model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let response: ChatResponse = self
            .post("chat/completions", &request, &self.config.chat_model)
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("Response contained no message content".to_string()))
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let request = EmbeddingRequest {
            model: &self.config.embedding_model,
            input: text,
        };

        let response: EmbeddingResponse = self
            .post("embeddings", &request, &self.config.embedding_model)
            .await?;

        response
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| LlmError::InvalidResponse("Response contained no embedding".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.config.chat_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OpenAiConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.chat_model, "gpt-4o");
        assert_eq!(config.embedding_model, "text-embedding-3-small");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = OpenAiConfig {
            timeout_secs: 0,
            ..OpenAiConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_check_credentials() {
        let provider = OpenAiProvider::new(OpenAiConfig::default()).unwrap();
        assert_eq!(provider.check_credentials(), Err(LlmError::AuthenticationMissing));

        let provider = OpenAiProvider::new(OpenAiConfig {
            api_key: Some("   ".to_string()),
            ..OpenAiConfig::default()
        })
        .unwrap();
        assert_eq!(provider.check_credentials(), Err(LlmError::AuthenticationMissing));

        let provider = OpenAiProvider::new(OpenAiConfig {
            api_key: Some("sk-test".to_string()),
            ..OpenAiConfig::default()
        })
        .unwrap();
        assert!(provider.check_credentials().is_ok());
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let provider = OpenAiProvider::new(OpenAiConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..OpenAiConfig::default()
        })
        .unwrap();
        assert_eq!(provider.url("embeddings"), "http://localhost:8080/v1/embeddings");
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, String::new(), "m"),
            LlmError::Authentication(_)
        ));
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, String::new(), "m"),
            LlmError::RateLimitExceeded
        );
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND, String::new(), "gpt-x"),
            LlmError::ModelNotAvailable("gpt-x".to_string())
        );
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, String::new(), "m"),
            LlmError::Communication(_)
        ));
    }
}
