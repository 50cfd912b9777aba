//! reqforge Extractor
//!
//! Turns a requirements document into functionality records using an LLM.
//!
//! # Architecture
//!
//! ```text
//! bytes → decode → TextChunker → ExtractionClient (per chunk) → DocumentAggregator → records
//!           └─ unusable text → raw payload prompt ─┘
//! ```
//!
//! # Key Features
//!
//! - **Line-preserving chunking**: chunks never split a line
//! - **Failure isolation**: a malformed response costs only its own chunk
//! - **Two-tier fallback**: decoded text first, raw encoded payload second
//! - **Lenient parsing**: fence stripping, array salvage, per-field defaults
//!
//! # Example Usage
//!
//! ```no_run
//! use reqforge_extractor::{ContentType, DocumentAggregator, ExtractorConfig};
//! use reqforge_llm::MockProvider;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = Arc::new(MockProvider::new(r#"[{"name": "Login"}]"#));
//! let aggregator = DocumentAggregator::new(llm, ExtractorConfig::default());
//!
//! let records = aggregator
//!     .process_document(b"The system shall let users log in.", ContentType::PlainText)
//!     .await?;
//!
//! println!("Extracted {} functionalities", records.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod aggregator;
mod chunking;
mod client;
mod config;
mod document;
mod error;
mod parser;
mod prompt;
mod types;


pub use aggregator::DocumentAggregator;
pub use chunking::{chunk_text, TextChunker};
pub use client::ExtractionClient;
pub use config::ExtractorConfig;
pub use document::{extract_text, is_usable_text, raw_payload};
pub use error::ExtractorError;
pub use parser::{parse_llm_response, strip_code_fences};
pub use types::{
    ChunkExtraction, ContentType, ExtractionReport, ExtractionStrategy, RecordCandidate,
};
