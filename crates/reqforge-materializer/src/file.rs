//! Parsed files and path normalization

use std::path::{Path, PathBuf};

/// A relative path and the full text destined for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Normalized relative path
    pub path: PathBuf,

    /// File body, never blank
    pub content: String,
}

impl GeneratedFile {
    /// Build a file from a raw path and body.
    ///
    /// Returns `None` when the path cannot be normalized or the body is
    /// blank after tidying.
    pub fn new(raw_path: &str, content: &str) -> Option<Self> {
        let path = normalize_relative_path(raw_path)?;
        let content = tidy_content(content);
        if content.is_empty() {
            return None;
        }
        Some(Self { path, content })
    }

    /// Path rendered with `/` separators, for display and matching
    pub fn display_path(&self) -> String {
        display_path(&self.path)
    }
}

/// Render a relative path with `/` separators
pub fn display_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Normalize a model-emitted path into a safe relative path.
///
/// Accepts `/` and `\` separators, strips decoration (backticks, quotes,
/// bold markers, a trailing colon), absolute prefixes and `.` segments.
/// Any `..` segment rejects the path.
///
/// ```
/// use reqforge_materializer::normalize_relative_path;
/// use std::path::PathBuf;
///
/// assert_eq!(
///     normalize_relative_path("`models\\user.py`"),
///     Some(PathBuf::from("models").join("user.py"))
/// );
/// assert_eq!(normalize_relative_path("../etc/passwd"), None);
/// ```
pub fn normalize_relative_path(raw: &str) -> Option<PathBuf> {
    let cleaned = raw
        .trim()
        .trim_matches(|c| matches!(c, '`' | '"' | '\'' | '*' | ':'))
        .trim()
        .replace('\\', "/");

    let without_drive = match cleaned.as_bytes() {
        [letter, b':', ..] if letter.is_ascii_alphabetic() => &cleaned[2..],
        _ => cleaned.as_str(),
    };

    let mut path = PathBuf::new();
    for segment in without_drive.split('/') {
        match segment.trim() {
            "" | "." => continue,
            ".." => return None,
            part => path.push(part),
        }
    }

    if path.as_os_str().is_empty() {
        None
    } else {
        Some(path)
    }
}

/// Drop leading blank lines and trailing whitespace, keeping the
/// indentation of the first code line.
pub fn tidy_content(content: &str) -> String {
    let trimmed_end = content.trim_end();
    let first_code_line = trimmed_end
        .lines()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(0);

    trimmed_end
        .lines()
        .skip(first_code_line)
        .collect::<Vec<_>>()
        .join("\n")
}
