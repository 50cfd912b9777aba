use super::{extension_of, has_known_extension, heading_path, split_sections, ParseStrategy};
use crate::config::DenyList;
use crate::file::GeneratedFile;
use tracing::debug;

/// Sub-rules of the heading strategy, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingRule {
    /// `models/...` or a `models.*` module
    Model,
    /// `views/...` or a `views.*` module
    View,
    /// `controllers/...`, a `controllers.*` module or a `*Controller` class
    Controller,
    /// `templates/...`; a bare `*.html` lands under `templates/`
    Template,
    /// `config/...`; bare `database.py` and `config.py` move under `config/`
    Config,
    /// Root entry points such as `app.py` or `main.py`
    AppEntry,
    /// Any other path with a known extension
    Generic,
}

const APP_ENTRIES: &[&str] = &["app.py", "main.py", "wsgi.py", "app.js", "server.js", "index.js", "program.cs"];

impl HeadingRule {
    /// Rules in the order they are tried
    pub const ORDER: [HeadingRule; 7] = [
        HeadingRule::Model,
        HeadingRule::View,
        HeadingRule::Controller,
        HeadingRule::Template,
        HeadingRule::Config,
        HeadingRule::AppEntry,
        HeadingRule::Generic,
    ];

    /// Target path for `path` if this rule claims it
    fn resolve(&self, path: &str) -> Option<String> {
        let lower = path.to_lowercase();
        let segments: Vec<&str> = lower.split('/').collect();
        let (dirs, base) = segments.split_at(segments.len().saturating_sub(1));
        let base = base.first().copied().unwrap_or_default();
        let in_dir = |name: &str| dirs.contains(&name);
        let stem = base.split('.').next().unwrap_or_default();
        // Layer rules only claim real file names, never prose headings like "Models"
        let is_file = extension_of(path).is_some();

        match self {
            HeadingRule::Model => (is_file && (in_dir("models") || stem == "models")).then(|| path.to_string()),
            HeadingRule::View => (is_file && (in_dir("views") || stem == "views")).then(|| path.to_string()),
            HeadingRule::Controller => (is_file
                && (in_dir("controllers") || stem == "controllers" || stem.ends_with("controller")))
            .then(|| path.to_string()),
            HeadingRule::Template => {
                if in_dir("templates") {
                    Some(path.to_string())
                } else if dirs.is_empty() && base.ends_with(".html") {
                    Some(format!("templates/{}", path))
                } else {
                    None
                }
            }
            HeadingRule::Config => {
                if in_dir("config") {
                    Some(path.to_string())
                } else if dirs.is_empty() && (base == "database.py" || base == "config.py") {
                    Some(format!("config/{}", path))
                } else {
                    None
                }
            }
            HeadingRule::AppEntry => (dirs.is_empty() && APP_ENTRIES.contains(&base)).then(|| path.to_string()),
            HeadingRule::Generic => has_known_extension(path).then(|| path.to_string()),
        }
    }
}

/// `#### <filename>` sections, each running to the next heading
#[derive(Debug, Clone)]
pub struct HeadingStrategy {
    deny: DenyList,
}

impl HeadingStrategy {
    /// Create the strategy with the paths it must never emit
    pub fn new(deny: DenyList) -> Self {
        Self { deny }
    }

    /// First rule claiming `path`, with the target path it maps to
    pub fn classify(&self, path: &str) -> Option<(HeadingRule, String)> {
        let path = path.replace('\\', "/");
        HeadingRule::ORDER
            .iter()
            .find_map(|rule| rule.resolve(&path).map(|target| (*rule, target)))
    }
}

impl ParseStrategy for HeadingStrategy {
    fn name(&self) -> &'static str {
        "headings"
    }

    fn try_parse(&self, text: &str) -> Vec<GeneratedFile> {
        let mut files = Vec::new();

        for section in split_sections(text, |line| line.strip_prefix("#### ")) {
            let Some(path) = heading_path(section.title) else {
                continue;
            };
            let Some((rule, target)) = self.classify(path) else {
                debug!("Heading '{}' does not name a recognizable file", path);
                continue;
            };
            if self.deny.is_denied(path) || self.deny.is_denied(&target) {
                debug!("Skipping denied file {}", target);
                continue;
            }
            if let Some(file) = GeneratedFile::new(&target, &section.body) {
                debug!("Heading rule {:?} mapped {} to {}", rule, path, file.display_path());
                files.push(file);
            }
        }

        files
    }
}
