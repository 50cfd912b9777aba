//! Configuration for the Extractor

use reqforge_llm::CompletionOptions;
use serde::{Deserialize, Serialize};

/// Default chunk budget in bytes, separators included
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 8000;

/// Shortest trimmed text considered worth chunking
pub const DEFAULT_MIN_USABLE_TEXT_CHARS: usize = 100;

/// Cap on the base64 payload sent by the raw-payload fallback
pub const DEFAULT_RAW_PAYLOAD_MAX_CHARS: usize = 10_000;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum chunk size in bytes
    pub max_chunk_size: usize,

    /// Extracted text no longer than this (after trimming) triggers the
    /// raw-payload fallback
    pub min_usable_text_chars: usize,

    /// Maximum characters of encoded payload included in the fallback prompt
    pub raw_payload_max_chars: usize,

    /// Sampling temperature for extraction calls
    pub temperature: f32,

    /// Token cap for extraction calls
    pub max_tokens: u32,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_chunk_size == 0 {
            return Err("max_chunk_size must be greater than 0".to_string());
        }
        if self.raw_payload_max_chars == 0 {
            return Err("raw_payload_max_chars must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be between 0.0 and 2.0".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Completion options used for every extraction call
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            system_prompt: Some(crate::prompt::SYSTEM_PROMPT.to_string()),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        let options = CompletionOptions::default();
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            min_usable_text_chars: DEFAULT_MIN_USABLE_TEXT_CHARS,
            raw_payload_max_chars: DEFAULT_RAW_PAYLOAD_MAX_CHARS,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        }
    }
}
