//! Document-level extraction: decode, chunk, extract, merge

use crate::chunking::TextChunker;
use crate::client::ExtractionClient;
use crate::config::ExtractorConfig;
use crate::document;
use crate::error::ExtractorError;
use crate::types::{ContentType, ExtractionReport, ExtractionStrategy};
use reqforge_domain::FunctionalityRecord;
use reqforge_llm::LlmProvider;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Drives the chunker and extraction client across a whole document.
///
/// Two tiers: format-appropriate text extraction, then a raw-payload prompt
/// when that text is unusable. Chunks are processed sequentially and a
/// malformed response only costs its own chunk. Records from different
/// chunks are concatenated in order, never merged, even when names repeat.
pub struct DocumentAggregator<P: LlmProvider> {
    llm: Arc<P>,
    client: ExtractionClient<P>,
    chunker: TextChunker,
    config: ExtractorConfig,
}

impl<P: LlmProvider> DocumentAggregator<P> {
    /// Create a new aggregator
    pub fn new(llm: Arc<P>, config: ExtractorConfig) -> Self {
        let client = ExtractionClient::new(Arc::clone(&llm), &config);
        let chunker = TextChunker::new(config.max_chunk_size);
        Self {
            llm,
            client,
            chunker,
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract all records from a raw document
    ///
    /// # Errors
    ///
    /// - [`ExtractorError::AuthenticationMissing`] before any call is made
    /// - [`ExtractorError::TransientService`] when a collaborator call fails
    /// - [`ExtractorError::NoFunctionalityFound`] when nothing was extracted
    pub async fn process_document(
        &self,
        raw: &[u8],
        content_type: ContentType,
    ) -> Result<Vec<FunctionalityRecord>, ExtractorError> {
        Ok(self.process_document_with_report(raw, content_type).await?.records)
    }

    /// Extract all records, returning per-chunk accounting alongside
    pub async fn process_document_with_report(
        &self,
        raw: &[u8],
        content_type: ContentType,
    ) -> Result<ExtractionReport, ExtractorError> {
        self.llm.check_credentials()?;

        info!("Processing {} document ({} bytes)", content_type, raw.len());

        let (text, decode_error) = match document::extract_text(raw, content_type) {
            Ok(text) => (text, None),
            Err(e) => {
                warn!("Text extraction failed: {}", e);
                (String::new(), Some(e.to_string()))
            }
        };
        debug!("Extracted {} characters of text", text.len());

        let mut report = if document::is_usable_text(&text, self.config.min_usable_text_chars) {
            self.extract_chunked(&text).await?
        } else {
            info!("Extracted text is not usable, falling back to raw payload");
            self.extract_raw_payload(raw).await?
        };
        report.decode_error = decode_error;

        if report.records.is_empty() {
            warn!(
                "No functionality found ({} chunks, {} malformed)",
                report.chunk_count,
                report.malformed_chunks.len()
            );
            return Err(ExtractorError::NoFunctionalityFound);
        }

        info!(
            "Extracted {} functionalities via {}",
            report.records.len(),
            report.strategy
        );
        Ok(report)
    }

    async fn extract_chunked(&self, text: &str) -> Result<ExtractionReport, ExtractorError> {
        let chunks = self.chunker.chunk(text);
        let total = chunks.len();
        info!("Split text into {} chunks", total);

        let mut report = ExtractionReport::new(ExtractionStrategy::ChunkedText);
        report.chunk_count = total;

        for (index, chunk) in chunks.iter().enumerate() {
            if chunk.trim().is_empty() {
                debug!("Skipping blank chunk {}/{}", index + 1, total);
                report.blank_chunks_skipped += 1;
                continue;
            }

            debug!("Processing chunk {}/{}", index + 1, total);
            let extraction = self.client.extract_chunk(chunk, index, total).await?;
            report.absorb(index, extraction);
        }

        Ok(report)
    }

    async fn extract_raw_payload(&self, raw: &[u8]) -> Result<ExtractionReport, ExtractorError> {
        let mut report = ExtractionReport::new(ExtractionStrategy::RawPayload);

        let (payload, truncated) = document::raw_payload(raw, self.config.raw_payload_max_chars);
        if payload.is_empty() {
            debug!("Empty document, nothing to send");
            return Ok(report);
        }

        report.chunk_count = 1;
        let extraction = self.client.extract_raw_payload(&payload, truncated).await?;
        report.absorb(0, extraction);
        Ok(report)
    }
}
