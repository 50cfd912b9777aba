//! Configuration for the Materializer

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Name of the file written when no strategy recognizes any file
pub const DEFAULT_FALLBACK_FILE_NAME: &str = "generated_code.txt";

/// Auxiliary files never materialized by default
pub const DEFAULT_DENY_LIST: &[&str] = &[
    "requirements.txt",
    "setup.py",
    "README.md",
    ".gitignore",
    "Dockerfile",
    ".env",
    "migrations/README.md",
];

/// Configuration for the Materializer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterializerConfig {
    /// File name used by the single-file fallback
    pub fallback_file_name: String,

    /// File names or relative paths that are stripped and never written
    pub deny_list: Vec<String>,

    /// Whether to synthesize support modules for legacy imports
    pub synthesize_support_files: bool,
}

impl MaterializerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let name = self.fallback_file_name.trim();
        if name.is_empty() {
            return Err("fallback_file_name must not be empty".to_string());
        }
        if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
            return Err("fallback_file_name must be a plain file name".to_string());
        }
        if self.deny_list().is_denied(name) {
            return Err("fallback_file_name must not be on the deny list".to_string());
        }
        Ok(())
    }

    /// Matcher over the configured deny list
    pub fn deny_list(&self) -> DenyList {
        DenyList::new(self.deny_list.iter().map(String::as_str))
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for MaterializerConfig {
    fn default() -> Self {
        Self {
            fallback_file_name: DEFAULT_FALLBACK_FILE_NAME.to_string(),
            deny_list: DEFAULT_DENY_LIST.iter().map(|s| s.to_string()).collect(),
            synthesize_support_files: true,
        }
    }
}

/// Case-insensitive matcher for denied files.
///
/// An entry without `/` matches that file name in any directory; an entry
/// with `/` matches that relative path only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DenyList {
    names: HashSet<String>,
    paths: HashSet<String>,
}

impl DenyList {
    /// Build from entries
    pub fn new<'a>(entries: impl IntoIterator<Item = &'a str>) -> Self {
        let mut list = Self::default();
        for entry in entries {
            let entry = entry.trim().replace('\\', "/").trim_matches('/').to_lowercase();
            if entry.is_empty() {
                continue;
            }
            if entry.contains('/') {
                list.paths.insert(entry);
            } else {
                list.names.insert(entry);
            }
        }
        list
    }

    /// Whether `path` (any separator style) is denied
    pub fn is_denied(&self, path: &str) -> bool {
        let normalized = path.trim().replace('\\', "/").trim_matches('/').to_lowercase();
        let base = normalized.rsplit('/').next().unwrap_or_default();
        self.names.contains(base) || self.paths.contains(&normalized)
    }
}
