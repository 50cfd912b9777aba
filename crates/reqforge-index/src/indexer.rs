//! Embedding annotation and record lookup

use crate::similarity::cosine_similarity;
use reqforge_domain::{FunctionalityRecord, FunctionalitySummary};
use reqforge_llm::LlmProvider;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Computes one embedding per record.
pub struct Indexer<P: LlmProvider> {
    llm: Arc<P>,
}

impl<P: LlmProvider> Indexer<P> {
    /// Create a new indexer
    pub fn new(llm: Arc<P>) -> Self {
        Self { llm }
    }

    /// Annotate every record with an embedding.
    ///
    /// Calls are sequential. A failed embedding leaves that record without
    /// one; it is never dropped.
    pub async fn index(&self, records: Vec<FunctionalityRecord>) -> RecordIndex {
        let total = records.len();
        info!("Indexing {} functionalities", total);

        let mut indexed = Vec::with_capacity(total);
        for (i, record) in records.into_iter().enumerate() {
            let text = record.embedding_text();
            match self.llm.embed(&text).await {
                Ok(embedding) => {
                    debug!("Embedded {}/{} '{}' ({} dims)", i + 1, total, record.name, embedding.len());
                    indexed.push(record.with_embedding(embedding));
                }
                Err(e) => {
                    warn!("Embedding failed for '{}', keeping it unembedded: {}", record.name, e);
                    indexed.push(record);
                }
            }
        }

        let index = RecordIndex::new(indexed);
        info!("Indexed {} functionalities ({} embedded)", index.len(), index.embedded_count());
        index
    }
}

/// Read-only set of indexed records in extraction order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordIndex {
    records: Vec<FunctionalityRecord>,
}

impl RecordIndex {
    /// Wrap already-annotated records
    pub fn new(records: Vec<FunctionalityRecord>) -> Self {
        Self { records }
    }

    /// All records
    pub fn all(&self) -> &[FunctionalityRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records carrying an embedding
    pub fn embedded_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_embedded()).count()
    }

    /// First record whose name contains `query`, ignoring case.
    ///
    /// A blank query matches nothing.
    pub fn find_by_name(&self, query: &str) -> Option<&FunctionalityRecord> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.records
            .iter()
            .find(|r| r.name.to_lowercase().contains(&needle))
    }

    /// Listing view of every record, duplicates included
    pub fn summaries(&self) -> Vec<FunctionalitySummary> {
        self.records.iter().map(FunctionalitySummary::from).collect()
    }

    /// Embedded records ranked by cosine similarity to `query`, best first.
    ///
    /// Records without an embedding or with a different dimension are
    /// skipped.
    pub fn most_similar(&self, query: &[f32], limit: usize) -> Vec<(&FunctionalityRecord, f32)> {
        let mut scored: Vec<(&FunctionalityRecord, f32)> = self
            .records
            .iter()
            .filter_map(|r| {
                let embedding = r.embedding.as_deref()?;
                cosine_similarity(query, embedding).map(|score| (r, score))
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(limit);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqforge_llm::MockProvider;

    fn record(name: &str) -> FunctionalityRecord {
        FunctionalityRecord::new(name, format!("{} description", name))
    }

    #[tokio::test]
    async fn test_index_attaches_embeddings() {
        let provider = MockProvider::default();
        let indexer = Indexer::new(Arc::new(provider.clone()));

        let index = indexer.index(vec![record("Login"), record("Logout")]).await;

        assert_eq!(index.len(), 2);
        assert_eq!(index.embedded_count(), 2);
        assert_eq!(provider.embed_calls(), 2);
    }

    #[tokio::test]
    async fn test_embedding_input_is_canonical_text() {
        let provider = MockProvider::default();
        provider.fail_embedding_when_contains("Login. Login description. . ");
        let indexer = Indexer::new(Arc::new(provider));

        let index = indexer.index(vec![record("Login")]).await;
        assert_eq!(index.embedded_count(), 0);
    }

    #[test]
    fn test_find_by_name_is_case_insensitive_substring() {
        let index = RecordIndex::new(vec![record("User Registration"), record("User Login")]);

        assert_eq!(index.find_by_name("login").map(|r| r.name.as_str()), Some("User Login"));
        assert_eq!(index.find_by_name("USER").map(|r| r.name.as_str()), Some("User Registration"));
        assert!(index.find_by_name("payments").is_none());
        assert!(index.find_by_name("  ").is_none());
    }

    #[test]
    fn test_summaries_keep_duplicates() {
        let index = RecordIndex::new(vec![record("User Login"), record("user-login")]);
        let summaries = index.summaries();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, summaries[1].id);
    }

    #[test]
    fn test_most_similar_ranks_embedded_only() {
        let index = RecordIndex::new(vec![
            record("North").with_embedding(vec![0.0, 1.0]),
            record("Unembedded"),
            record("East").with_embedding(vec![1.0, 0.0]),
            record("NorthEast").with_embedding(vec![1.0, 1.0]),
            record("Wrong Dims").with_embedding(vec![1.0, 0.0, 0.0]),
        ]);

        let ranked = index.most_similar(&[1.0, 0.1], 2);
        let names: Vec<_> = ranked.iter().map(|(r, _)| r.name.as_str()).collect();
        assert_eq!(names, vec!["East", "NorthEast"]);
    }
}
