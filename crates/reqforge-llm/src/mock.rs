//! Scripted provider for deterministic tests
//!
//! Completions are resolved in this order:
//!
//! 1. the first prompt rule whose needle is contained in the prompt
//! 2. the next queued response
//! 3. the default response
//!
//! Embeddings are hash-based: deterministic, unit length, and different for
//! different texts. They carry no semantic meaning.

use crate::{CompletionOptions, LlmError, LlmProvider};
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Default embedding dimension produced by the mock
pub const DEFAULT_MOCK_DIMENSION: usize = 16;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(LlmError),
}

impl Reply {
    fn into_result(self) -> Result<String, LlmError> {
        match self {
            Reply::Text(text) => Ok(text),
            Reply::Fail(err) => Err(err),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    rules: Vec<(String, Reply)>,
    queue: VecDeque<Reply>,
    embedding_failures: Vec<String>,
    prompts: Vec<String>,
    completion_calls: usize,
    embed_calls: usize,
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network
/// calls. Clones share state, so a test can keep a handle for assertions
/// after moving the provider into a pipeline stage.
///
/// # Examples
///
/// ```
/// use reqforge_llm::{CompletionOptions, LlmProvider, MockProvider};
///
/// # async fn example() {
/// let provider = MockProvider::new("[]");
/// provider.when_prompt_contains("CHUNK 2/2", r#"[{"name": "Login"}]"#);
///
/// let options = CompletionOptions::default();
/// assert_eq!(provider.complete("CHUNK 1/2", &options).await.unwrap(), "[]");
/// assert!(provider.complete("CHUNK 2/2", &options).await.unwrap().contains("Login"));
/// assert_eq!(provider.completion_calls(), 2);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    dimension: usize,
    credentials_present: bool,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            dimension: DEFAULT_MOCK_DIMENSION,
            credentials_present: true,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Simulate a provider with no credential configured
    pub fn without_credentials(mut self) -> Self {
        self.credentials_present = false;
        self
    }

    /// Set the embedding dimension
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Reply with `response` whenever the prompt contains `needle`
    pub fn when_prompt_contains(&self, needle: impl Into<String>, response: impl Into<String>) {
        self.lock()
            .rules
            .push((needle.into(), Reply::Text(response.into())));
    }

    /// Fail with `error` whenever the prompt contains `needle`
    pub fn fail_when_prompt_contains(&self, needle: impl Into<String>, error: LlmError) {
        self.lock().rules.push((needle.into(), Reply::Fail(error)));
    }

    /// Queue a one-shot response
    pub fn push_response(&self, response: impl Into<String>) {
        self.lock().queue.push_back(Reply::Text(response.into()));
    }

    /// Queue a one-shot failure
    pub fn push_error(&self, error: LlmError) {
        self.lock().queue.push_back(Reply::Fail(error));
    }

    /// Fail embedding requests whose text contains `needle`
    pub fn fail_embedding_when_contains(&self, needle: impl Into<String>) {
        self.lock().embedding_failures.push(needle.into());
    }

    /// Number of completion calls made
    pub fn completion_calls(&self) -> usize {
        self.lock().completion_calls
    }

    /// Number of embedding calls made
    pub fn embed_calls(&self) -> usize {
        self.lock().embed_calls
    }

    /// Every prompt received, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.lock().prompts.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hash text with a seed to get a deterministic value in [-1, 1]
    fn hash_with_seed(text: &str, seed: u64) -> f32 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        seed.hash(&mut hasher);
        let hash_value = hasher.finish();

        let normalized = (hash_value as f64 / u64::MAX as f64) * 2.0 - 1.0;
        normalized as f32
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("[]")
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn check_credentials(&self) -> Result<(), LlmError> {
        if self.credentials_present {
            Ok(())
        } else {
            Err(LlmError::AuthenticationMissing)
        }
    }

    async fn complete(&self, prompt: &str, _options: &CompletionOptions) -> Result<String, LlmError> {
        self.check_credentials()?;

        let mut state = self.lock();
        state.completion_calls += 1;
        state.prompts.push(prompt.to_string());

        if let Some((_, reply)) = state.rules.iter().find(|(needle, _)| prompt.contains(needle.as_str())) {
            return reply.clone().into_result();
        }

        if let Some(reply) = state.queue.pop_front() {
            return reply.into_result();
        }

        Ok(self.default_response.clone())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        self.check_credentials()?;

        {
            let mut state = self.lock();
            state.embed_calls += 1;
            if state.embedding_failures.iter().any(|needle| text.contains(needle.as_str())) {
                return Err(LlmError::Communication("mock embedding failure".to_string()));
            }
        }

        if text.is_empty() {
            return Err(LlmError::InvalidResponse("Empty text cannot be embedded".to_string()));
        }

        let mut embedding: Vec<f32> = (0..self.dimension)
            .map(|i| Self::hash_with_seed(text, i as u64))
            .collect();

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }

        Ok(embedding)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
