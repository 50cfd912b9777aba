//! Current-document working set

use crate::indexer::RecordIndex;
use std::path::Path;

/// Project name used when the source has no usable file stem
pub const DEFAULT_PROJECT_NAME: &str = "srs-project";

/// Records from one ingested document.
///
/// Created on ingest and replaced, never mutated, by the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    source_name: String,
    project_name: String,
    index: RecordIndex,
}

impl Session {
    /// Create a session for a document; the project name derives from it
    pub fn new(source_name: impl Into<String>, index: RecordIndex) -> Self {
        let source_name = source_name.into();
        let project_name = project_name_from_source(&source_name);
        Self {
            source_name,
            project_name,
            index,
        }
    }

    /// Name of the ingested document
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Directory name for generated projects
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Indexed records
    pub fn index(&self) -> &RecordIndex {
        &self.index
    }
}

/// Derive a directory-safe project name from a document name.
///
/// Takes the file stem and replaces every non-alphanumeric ASCII character
/// with `_`, lowercased.
///
/// ```
/// use reqforge_index::project_name_from_source;
///
/// assert_eq!(project_name_from_source("docs/Library SRS v2.pdf"), "library_srs_v2");
/// assert_eq!(project_name_from_source(""), "srs-project");
/// ```
pub fn project_name_from_source(source: &str) -> String {
    let stem = Path::new(source)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    if stem.is_empty() {
        return DEFAULT_PROJECT_NAME.to_string();
    }

    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
