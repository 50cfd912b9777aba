//! Parsing strategies for freeform generation responses
//!
//! Strategies are tried in order by the materializer; the first one that
//! yields at least one file wins and later ones never run.

mod boundary;
mod heading;
mod layout;

pub use boundary::BoundaryMarkerStrategy;
pub use heading::{HeadingRule, HeadingStrategy};
pub use layout::LanguageLayoutStrategy;

use crate::config::DenyList;
use crate::file::GeneratedFile;

/// Extensions recognized as source or asset files in headings
pub const KNOWN_EXTENSIONS: &[&str] = &[
    "py", "js", "mjs", "jsx", "ts", "tsx", "java", "cs", "cshtml", "html", "css", "json", "xml", "yml",
    "yaml", "md", "txt", "sql", "toml", "ini", "cfg", "properties",
];

/// One way of recognizing files in a cleaned response
pub trait ParseStrategy: Send + Sync {
    /// Strategy name, reported with the result
    fn name(&self) -> &'static str;

    /// Files recognized in `text`, in document order; empty when the
    /// strategy does not apply
    fn try_parse(&self, text: &str) -> Vec<GeneratedFile>;
}

/// The standard cascade: boundary markers, headings, language layout
pub fn default_cascade(deny: &DenyList) -> Vec<Box<dyn ParseStrategy>> {
    vec![
        Box::new(BoundaryMarkerStrategy::new()),
        Box::new(HeadingStrategy::new(deny.clone())),
        Box::new(LanguageLayoutStrategy::new(deny.clone())),
    ]
}

/// Lowercased extension of a `/`-separated path, if any
pub(crate) fn extension_of(path: &str) -> Option<String> {
    let file_name = path.rsplit('/').next()?;
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Whether `path` ends in one of [`KNOWN_EXTENSIONS`]
pub(crate) fn has_known_extension(path: &str) -> bool {
    extension_of(path).is_some_and(|ext| KNOWN_EXTENSIONS.contains(&ext.as_str()))
}

/// A heading line and the body lines that follow it
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Section<'a> {
    pub(crate) title: &'a str,
    pub(crate) body: String,
}

/// Split `text` at lines for which `title_of` returns a title.
///
/// Text before the first heading is dropped.
pub(crate) fn split_sections<'a, F>(text: &'a str, title_of: F) -> Vec<Section<'a>>
where
    F: Fn(&'a str) -> Option<&'a str>,
{
    let mut sections = Vec::new();
    let mut current: Option<(&str, Vec<&str>)> = None;

    for line in text.split('\n') {
        if let Some(title) = title_of(line) {
            if let Some((title, body)) = current.take() {
                sections.push(Section { title, body: body.join("\n") });
            }
            current = Some((title, Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }

    if let Some((title, body)) = current {
        sections.push(Section { title, body: body.join("\n") });
    }

    sections
}

/// First whitespace-separated token of a heading, with markdown decoration
/// removed
pub(crate) fn heading_path(title: &str) -> Option<&str> {
    let token = title
        .split_whitespace()
        .next()?
        .trim_matches(|c| matches!(c, '`' | '*' | '"' | '\'' | ':'));
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
