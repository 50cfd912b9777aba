//! reqforge Domain Layer
//!
//! Core data model shared by every stage of the requirements-to-code pipeline.
//!
//! ## Key Concepts
//!
//! - **Functionality record**: one independently implementable feature
//!   extracted from a requirements document
//! - **Functionality summary**: the lightweight view handed to callers that
//!   list what a document contains
//!
//! ## Architecture
//!
//! This crate holds plain data and pure helpers only. Collaborator traits
//! (LLM completion, embeddings) live in `reqforge-llm`; pipeline stages live
//! in their own crates and depend on this one.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod record;
pub mod summary;

// Re-exports for convenience
pub use record::FunctionalityRecord;
pub use summary::{slugify, FunctionalitySummary};
