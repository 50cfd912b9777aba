//! reqforge Index
//!
//! Semantic annotation and lookup of extracted functionality records.
//!
//! The [`Indexer`] attaches an embedding to every record it can; records
//! whose embedding request fails are kept without one. The resulting
//! [`RecordIndex`] answers name lookups lexically and offers cosine ranking
//! over the embedded subset. A [`Session`] binds one index to the document
//! it came from and is replaced wholesale on the next ingestion.

#![warn(missing_docs)]

mod indexer;
mod session;
mod similarity;

pub use indexer::{Indexer, RecordIndex};
pub use session::{project_name_from_source, Session, DEFAULT_PROJECT_NAME};
pub use similarity::cosine_similarity;
