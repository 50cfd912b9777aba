//! Functionality record - the unit extracted from a requirements document

use serde::{Deserialize, Serialize};

/// One extracted, independently implementable feature.
///
/// Records are created by the extraction stage, annotated with an embedding
/// by the indexer and read-only afterwards. Two records may share a name:
/// the pipeline keeps them as separate entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionalityRecord {
    /// Feature name, the identity used for lookup (never empty)
    pub name: String,

    /// What the feature does
    #[serde(default)]
    pub description: String,

    /// Ordered use cases
    #[serde(default)]
    pub use_cases: Vec<String>,

    /// Ordered workflow / activity descriptions
    #[serde(default)]
    pub activity_diagrams: Vec<String>,

    /// Free-form additional context
    #[serde(default)]
    pub context: String,

    /// Ordered requirement statements
    #[serde(default)]
    pub requirements: Vec<String>,

    /// Names of other records this one depends on
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Semantic embedding, present only after indexing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl FunctionalityRecord {
    /// Create a record with only a name and description set
    ///
    /// # Examples
    ///
    /// ```
    /// use reqforge_domain::FunctionalityRecord;
    ///
    /// let record = FunctionalityRecord::new("User Login", "Authenticate users");
    /// assert_eq!(record.name, "User Login");
    /// assert!(record.embedding.is_none());
    /// ```
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            use_cases: Vec::new(),
            activity_diagrams: Vec::new(),
            context: String::new(),
            requirements: Vec::new(),
            dependencies: Vec::new(),
            embedding: None,
        }
    }

    /// Whether the record carries a usable name
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Whether an embedding has been attached
    pub fn is_embedded(&self) -> bool {
        self.embedding.is_some()
    }

    /// Return a copy of this record with the given embedding attached
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Canonical text used to compute the record's embedding.
    ///
    /// Name, description, context and the requirements joined by `", "`,
    /// separated by `". "`.
    pub fn embedding_text(&self) -> String {
        format!(
            "{}. {}. {}. {}",
            self.name,
            self.description,
            self.context,
            self.requirements.join(", ")
        )
    }
}
