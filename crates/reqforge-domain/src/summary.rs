//! Caller-facing summaries of extracted records

use crate::FunctionalityRecord;
use serde::{Deserialize, Serialize};

/// Lightweight listing entry for one functionality.
///
/// `id` is derived from the record name by [`slugify`]. Ids are not
/// guaranteed unique: two names that normalize to the same slug both keep
/// their entry, so callers should prefer name-based lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionalitySummary {
    /// Slug derived from the name
    pub id: String,

    /// Display title (the record name)
    pub title: String,

    /// Record description
    pub description: String,

    /// Record use cases
    pub use_cases: Vec<String>,
}

impl From<&FunctionalityRecord> for FunctionalitySummary {
    fn from(record: &FunctionalityRecord) -> Self {
        Self {
            id: slugify(&record.name),
            title: record.name.clone(),
            description: record.description.clone(),
            use_cases: record.use_cases.clone(),
        }
    }
}

/// Lowercase `name` and replace every run of non-alphanumeric characters
/// with a single `-`, trimming separators at both ends.
///
/// # Examples
///
/// ```
/// use reqforge_domain::slugify;
///
/// assert_eq!(slugify("User Registration & Authentication"), "user-registration-authentication");
/// assert_eq!(slugify("  Email  Composition!"), "email-composition");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}
