//! Single extraction call against the completion collaborator

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_llm_response;
use crate::prompt::PromptBuilder;
use crate::types::ChunkExtraction;
use reqforge_domain::FunctionalityRecord;
use reqforge_llm::{CompletionOptions, LlmProvider};
use std::sync::Arc;
use tracing::{debug, warn};

/// Wraps one collaborator call per chunk.
///
/// Collaborator failures propagate; unparseable output is recovered as an
/// empty, malformed-flagged result so the caller can move on to the next
/// chunk.
pub struct ExtractionClient<P: LlmProvider> {
    llm: Arc<P>,
    options: CompletionOptions,
}

impl<P: LlmProvider> ExtractionClient<P> {
    /// Create a new client
    pub fn new(llm: Arc<P>, config: &ExtractorConfig) -> Self {
        Self {
            llm,
            options: config.completion_options(),
        }
    }

    /// Extract records from one chunk; `index` is zero-based
    pub async fn extract(
        &self,
        chunk: &str,
        index: usize,
        total: usize,
    ) -> Result<Vec<FunctionalityRecord>, ExtractorError> {
        Ok(self.extract_chunk(chunk, index, total).await?.records)
    }

    /// Extract records from one chunk, keeping parse accounting
    pub async fn extract_chunk(
        &self,
        chunk: &str,
        index: usize,
        total: usize,
    ) -> Result<ChunkExtraction, ExtractorError> {
        let prompt = PromptBuilder::for_chunk(chunk, index, total).build();
        let label = format!("chunk {}/{}", index + 1, total);
        self.run(&prompt, &label).await
    }

    /// Extract records from an encoded raw document payload
    pub async fn extract_raw_payload(
        &self,
        payload: &str,
        truncated: bool,
    ) -> Result<ChunkExtraction, ExtractorError> {
        let prompt = PromptBuilder::for_raw_payload(payload, truncated).build();
        self.run(&prompt, "raw payload").await
    }

    async fn run(&self, prompt: &str, label: &str) -> Result<ChunkExtraction, ExtractorError> {
        debug!("Sending {} ({} chars) to {}", label, prompt.len(), self.llm.model_name());

        let response = self.llm.complete(prompt, &self.options).await?;

        match parse_llm_response(&response) {
            Ok(extraction) => {
                debug!("Found {} functionalities in {}", extraction.records.len(), label);
                Ok(extraction)
            }
            Err(e) => {
                warn!("Malformed response for {}: {}", label, e);
                Ok(ChunkExtraction::malformed(e.to_string()))
            }
        }
    }
}
