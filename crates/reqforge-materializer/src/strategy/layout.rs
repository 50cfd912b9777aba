use super::{extension_of, heading_path, split_sections, ParseStrategy, KNOWN_EXTENSIONS};
use crate::config::DenyList;
use crate::file::GeneratedFile;
use crate::language::{detect_language, Language};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Directories that mark a path comment as a file boundary
const CONVENTIONAL_DIRS: &[&str] = &[
    "models",
    "views",
    "controllers",
    "templates",
    "routes",
    "config",
    "entity",
    "repository",
    "service",
    "services",
    "src",
];

fn generic_heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let extensions = KNOWN_EXTENSIONS.join("|");
        let pattern = format!(r"(?i)^#{{1,4}}\s+[`*]*([^\s`*]+\.(?:{}))[`*:]*\s*$", extensions);
        Regex::new(&pattern).expect("valid heading regex")
    })
}

/// Language-aware splitting on path comments such as `# models/user.py`
/// or `// controllers/UserController.java`.
///
/// Only applies when the text has no `#### ` headings. Falls back to a
/// generic `#`..`####` heading scan when no path comment qualifies.
#[derive(Debug, Clone)]
pub struct LanguageLayoutStrategy {
    deny: DenyList,
}

impl LanguageLayoutStrategy {
    /// Create the strategy with the paths it must never emit
    pub fn new(deny: DenyList) -> Self {
        Self { deny }
    }

    fn collect<'a>(&self, sections: impl IntoIterator<Item = (&'a str, String)>, language: Language) -> Vec<GeneratedFile> {
        let mut files = Vec::new();
        for (path, body) in sections {
            let target = match language.default_source_dir() {
                Some(dir) if !path.contains('/') && !path.contains('\\') => format!("{}/{}", dir, path),
                _ => path.to_string(),
            };
            if self.deny.is_denied(path) || self.deny.is_denied(&target) {
                debug!("Skipping denied file {}", target);
                continue;
            }
            if let Some(file) = GeneratedFile::new(&target, &body) {
                files.push(file);
            }
        }
        files
    }
}

/// Path named by a comment line, if it qualifies as a file boundary for
/// `language`
fn path_comment<'a>(line: &'a str, language: Language) -> Option<&'a str> {
    let trimmed = line.trim_start();
    let rest = language
        .comment_prefixes()
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))?
        .trim_start();
    let rest = rest
        .strip_prefix("File:")
        .or_else(|| rest.strip_prefix("file:"))
        .unwrap_or(rest)
        .trim_start();

    let path = heading_path(rest)?;
    let normalized = path.replace('\\', "/");
    let in_conventional_dir = normalized
        .split('/')
        .rev()
        .skip(1)
        .any(|dir| CONVENTIONAL_DIRS.contains(&dir.to_lowercase().as_str()));
    let has_language_extension =
        extension_of(&normalized).is_some_and(|ext| language.extensions().contains(&ext.as_str()));

    if (in_conventional_dir && extension_of(&normalized).is_some()) || has_language_extension {
        Some(path)
    } else {
        None
    }
}

impl ParseStrategy for LanguageLayoutStrategy {
    fn name(&self) -> &'static str {
        "language-layout"
    }

    fn try_parse(&self, text: &str) -> Vec<GeneratedFile> {
        if text.lines().any(|line| line.starts_with("#### ")) {
            return Vec::new();
        }

        let language = detect_language(text);
        debug!("Detected dominant language: {}", language);

        if language != Language::Unknown {
            let sections = split_sections(text, |line| path_comment(line, language));
            let files = self.collect(sections.into_iter().map(|s| (s.title, s.body)), language);
            if !files.is_empty() {
                return files;
            }
        }

        let sections = split_sections(text, |line| {
            generic_heading_regex()
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
        });
        self.collect(sections.into_iter().map(|s| (s.title, s.body)), Language::Unknown)
    }
}
