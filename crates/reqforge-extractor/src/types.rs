//! Types for the extraction pipeline

use reqforge_domain::FunctionalityRecord;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// Declared format of a raw document payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    /// Page-description binary document
    Pdf,
    /// Word-processor binary document
    Docx,
    /// UTF-8 text
    PlainText,
    /// Unrecognized; decoded as plain text
    Unknown,
}

impl ContentType {
    /// Map a MIME type hint onto a content type
    ///
    /// ```
    /// use reqforge_extractor::ContentType;
    ///
    /// assert_eq!(ContentType::from_mime("application/pdf"), ContentType::Pdf);
    /// assert_eq!(ContentType::from_mime("text/markdown"), ContentType::PlainText);
    /// ```
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/pdf" => ContentType::Pdf,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            | "application/msword" => ContentType::Docx,
            "" => ContentType::Unknown,
            _ if essence.starts_with("text/") => ContentType::PlainText,
            _ => ContentType::Unknown,
        }
    }

    /// Infer a content type from a file extension
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("pdf") => ContentType::Pdf,
            Some("docx") | Some("doc") => ContentType::Docx,
            Some("txt") | Some("md") | Some("markdown") | Some("text") => ContentType::PlainText,
            _ => ContentType::Unknown,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentType::Pdf => "pdf",
            ContentType::Docx => "docx",
            ContentType::PlainText => "plain-text",
            ContentType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// One record as emitted by the model, before identity checks.
///
/// Every field is optional at this boundary. List fields accept an array,
/// a bare string or `null`; text fields accept strings, numbers or `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCandidate {
    /// Feature name
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,

    /// Feature description
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,

    /// Use cases
    #[serde(default, alias = "use_cases", deserialize_with = "lenient_list")]
    pub use_cases: Vec<String>,

    /// Activity / workflow descriptions
    #[serde(default, alias = "activity_diagrams", deserialize_with = "lenient_list")]
    pub activity_diagrams: Vec<String>,

    /// Free-form context
    #[serde(default, deserialize_with = "lenient_text")]
    pub context: String,

    /// Requirement statements
    #[serde(default, deserialize_with = "lenient_list")]
    pub requirements: Vec<String>,

    /// Names of other features
    #[serde(default, deserialize_with = "lenient_list")]
    pub dependencies: Vec<String>,
}

impl RecordCandidate {
    /// Convert into a record, or `None` when the name is missing
    pub fn into_record(self) -> Option<FunctionalityRecord> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }

        let mut record = FunctionalityRecord::new(name, self.description);
        record.use_cases = self.use_cases;
        record.activity_diagrams = self.activity_diagrams;
        record.context = self.context;
        record.requirements = self.requirements;
        record.dependencies = self.dependencies;
        Some(record)
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(scalar_to_string).unwrap_or_default())
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items = match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.into_iter().filter_map(scalar_to_string).collect(),
        Some(Value::String(s)) if s.trim().is_empty() => Vec::new(),
        Some(other) => scalar_to_string(other).into_iter().collect(),
    };
    Ok(items)
}

/// Outcome of one extraction call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkExtraction {
    /// Records with a usable name, in response order
    pub records: Vec<FunctionalityRecord>,

    /// Parse failure reason, when the response was unusable
    pub malformed: Option<String>,

    /// Elements dropped for lacking a name
    pub discarded_nameless: usize,

    /// Elements that were not record objects
    pub skipped_elements: usize,
}

impl ChunkExtraction {
    /// A result for a response that could not be parsed
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self {
            malformed: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Whether the response was parsed
    pub fn is_malformed(&self) -> bool {
        self.malformed.is_some()
    }
}

/// Which path produced the records of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionStrategy {
    /// Decoded text, chunked and extracted chunk by chunk
    ChunkedText,
    /// Encoded raw bytes sent in a single prompt
    RawPayload,
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionStrategy::ChunkedText => f.write_str("chunked-text"),
            ExtractionStrategy::RawPayload => f.write_str("raw-payload"),
        }
    }
}

/// Document-level extraction result with per-chunk accounting
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    /// All records, concatenated in chunk order
    pub records: Vec<FunctionalityRecord>,

    /// Path that produced the records
    pub strategy: ExtractionStrategy,

    /// Chunks produced by the chunker (1 for the raw-payload path)
    pub chunk_count: usize,

    /// Whitespace-only chunks that were not sent
    pub blank_chunks_skipped: usize,

    /// Indices of chunks whose response could not be parsed
    pub malformed_chunks: Vec<usize>,

    /// Records dropped for lacking a name
    pub discarded_nameless: usize,

    /// Decoder failure that forced the fallback, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,
}

impl ExtractionReport {
    pub(crate) fn new(strategy: ExtractionStrategy) -> Self {
        Self {
            records: Vec::new(),
            strategy,
            chunk_count: 0,
            blank_chunks_skipped: 0,
            malformed_chunks: Vec::new(),
            discarded_nameless: 0,
            decode_error: None,
        }
    }

    pub(crate) fn absorb(&mut self, index: usize, extraction: ChunkExtraction) {
        if extraction.is_malformed() {
            self.malformed_chunks.push(index);
        }
        self.discarded_nameless += extraction.discarded_nameless;
        self.records.extend(extraction.records);
    }
}
