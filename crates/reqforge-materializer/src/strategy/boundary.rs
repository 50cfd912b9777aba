use super::ParseStrategy;
use crate::file::GeneratedFile;
use regex::Regex;
use std::sync::OnceLock;

fn boundary_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)=== FILE: ([^\n]+?) ===[ \t]*\n(.*?)\n?=== END FILE ===").expect("valid boundary regex")
    })
}

/// Explicit `=== FILE: path ===` ... `=== END FILE ===` blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryMarkerStrategy;

impl BoundaryMarkerStrategy {
    /// Create the strategy
    pub fn new() -> Self {
        Self
    }
}

impl ParseStrategy for BoundaryMarkerStrategy {
    fn name(&self) -> &'static str {
        "boundary-markers"
    }

    fn try_parse(&self, text: &str) -> Vec<GeneratedFile> {
        boundary_regex()
            .captures_iter(text)
            .filter_map(|caps| GeneratedFile::new(&caps[1], &caps[2]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parses_blocks_in_order() {
        let text = "=== FILE: app.py ===\nimport os\n=== END FILE ===\n\n=== FILE: models/user.py ===\nclass User:\n    pass\n=== END FILE ===";
        let files = BoundaryMarkerStrategy::new().try_parse(text);

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, PathBuf::from("app.py"));
        assert_eq!(files[0].content, "import os");
        assert_eq!(files[1].path, PathBuf::from("models").join("user.py"));
        assert_eq!(files[1].content, "class User:\n    pass");
    }

    #[test]
    fn test_skips_empty_and_traversal_blocks() {
        let text = "=== FILE: empty.py ===\n\n=== END FILE ===\n=== FILE: ../evil.py ===\nx\n=== END FILE ===";
        assert!(BoundaryMarkerStrategy::new().try_parse(text).is_empty());
    }

    #[test]
    fn test_unterminated_block_is_ignored() {
        let text = "=== FILE: app.py ===\nimport os\n";
        assert!(BoundaryMarkerStrategy::new().try_parse(text).is_empty());
    }
}
