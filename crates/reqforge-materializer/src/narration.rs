//! Narration stripping before parsing
//!
//! An ordered list of `(pattern, action)` rules, each removing one kind of
//! non-code text the model tends to add. Rules only remove text matching a
//! known pattern; unrecognized trailing content is left alone.

use crate::config::DenyList;
use regex::{Captures, Regex};
use std::sync::OnceLock;
use tracing::debug;

/// Openers of explanatory paragraphs the model appends after code
pub const EXPLANATORY_OPENERS: &[&str] = &[
    "This code provides",
    "This implementation",
    "This structure",
    "This MVC",
    "This provides",
    "This includes",
    "This follows",
    "This adheres",
    "This ensures",
    "This creates",
];

/// Openers of prose lines the model mixes into generated test files
pub const TEST_NARRATION_OPENERS: &[&str] = &[
    "Note",
    "This test",
    "The test",
    "Test file",
    "Here is",
    "Here are",
    "The following",
    "Below is",
    "Below are",
    "Make sure",
    "Ensure that",
    "Remember",
    "Important",
    "Please note",
    "Keep in mind",
    "Save this",
    "This assumes",
    "The code assumes",
    "This code assumes",
];

/// What a rule does with text its pattern matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    /// Remove each matching line
    RemoveLine,
    /// Remove each matching line that does not read as code
    RemoveProseLine,
    /// Remove every match
    RemoveMatch,
    /// Remove a matched boundary block when its path is denied
    RemoveDeniedBlock,
    /// Remove a matched heading and its body when the heading names a
    /// denied file
    RemoveDeniedSection,
    /// Remove from a matching paragraph opener to the next file marker,
    /// unless a code line follows before that marker
    RemoveUntilNextMarker,
}

/// One narration rule
#[derive(Debug, Clone)]
pub struct NarrationRule {
    name: &'static str,
    pattern: &'static Regex,
    action: RuleAction,
}

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid narration regex"))
}

/// Whether a line reads as source code rather than prose
pub fn looks_like_code(line: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = cached(
        &RE,
        r#"^(?:    |\t)\S|^\s*(?:from|import|def|class|return|const|let|var|function|public|private|protected|using|package|namespace|export|module\.exports|if|for|while)\b|^\s*[@}\])]|[{};(]\s*$|"""|'''| = |=>"#,
    );
    re.is_match(line)
}

/// Whether a line starts or ends a file in any marker syntax
pub fn is_file_marker(line: &str) -> bool {
    line.starts_with("#### ") || line.starts_with("=== FILE:") || line.starts_with("=== END FILE ===")
}

impl NarrationRule {
    /// Lines that are only a code fence, with or without a language tag
    pub fn fence_delimiters() -> Self {
        static RE: OnceLock<Regex> = OnceLock::new();
        Self {
            name: "fence-delimiters",
            pattern: cached(&RE, r"^\s*```[\w+#.\-]*\s*$"),
            action: RuleAction::RemoveLine,
        }
    }

    /// `=== FILE: <denied> ===` blocks through their end marker
    pub fn denied_boundary_blocks() -> Self {
        static RE: OnceLock<Regex> = OnceLock::new();
        Self {
            name: "denied-boundary-blocks",
            pattern: cached(&RE, r"(?ms)^=== FILE: ([^\n]+?) ===[ \t]*\n.*?^=== END FILE ===[ \t]*(?:\n|\z)"),
            action: RuleAction::RemoveDeniedBlock,
        }
    }

    /// `#### <denied>` headings through the next file marker
    pub fn denied_heading_sections() -> Self {
        static RE: OnceLock<Regex> = OnceLock::new();
        Self {
            name: "denied-heading-sections",
            pattern: cached(&RE, r"^#### +(\S+)"),
            action: RuleAction::RemoveDeniedSection,
        }
    }

    /// Explanatory paragraphs through the next file marker
    pub fn explanatory_paragraphs() -> Self {
        static RE: OnceLock<Regex> = OnceLock::new();
        let alternatives = EXPLANATORY_OPENERS
            .iter()
            .map(|opener| regex::escape(opener))
            .collect::<Vec<_>>()
            .join("|");
        Self {
            name: "explanatory-paragraphs",
            pattern: cached(&RE, &format!("^(?:{})", alternatives)),
            action: RuleAction::RemoveUntilNextMarker,
        }
    }

    /// `<!-- ... -->` comments, which are not valid in any target language
    pub fn html_comments() -> Self {
        static RE: OnceLock<Regex> = OnceLock::new();
        Self {
            name: "html-comments",
            pattern: cached(&RE, r"(?s)<!--.*?-->"),
            action: RuleAction::RemoveMatch,
        }
    }

    /// Prose lines opening with a [`TEST_NARRATION_OPENERS`] phrase
    pub fn test_narration_lines() -> Self {
        static RE: OnceLock<Regex> = OnceLock::new();
        let alternatives = TEST_NARRATION_OPENERS
            .iter()
            .map(|opener| regex::escape(opener))
            .collect::<Vec<_>>()
            .join("|");
        Self {
            name: "test-narration-lines",
            pattern: cached(&RE, &format!(r"^\s*(?:{})\b", alternatives)),
            action: RuleAction::RemoveProseLine,
        }
    }

    /// Rule name, for logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Rule action
    pub fn action(&self) -> RuleAction {
        self.action
    }

    /// Apply this rule to `text`
    pub fn apply(&self, text: &str, deny: &DenyList) -> String {
        match self.action {
            RuleAction::RemoveLine => text
                .split('\n')
                .filter(|line| !self.pattern.is_match(line))
                .collect::<Vec<_>>()
                .join("\n"),
            RuleAction::RemoveProseLine => text
                .split('\n')
                .filter(|line| !self.pattern.is_match(line) || looks_like_code(line))
                .collect::<Vec<_>>()
                .join("\n"),
            RuleAction::RemoveMatch => self.pattern.replace_all(text, "").into_owned(),
            RuleAction::RemoveDeniedBlock => self
                .pattern
                .replace_all(text, |caps: &Captures| {
                    if deny.is_denied(&caps[1]) {
                        String::new()
                    } else {
                        caps[0].to_string()
                    }
                })
                .into_owned(),
            RuleAction::RemoveDeniedSection => {
                let mut kept = Vec::new();
                let mut skipping = false;
                for line in text.split('\n') {
                    if is_file_marker(line) {
                        skipping = self
                            .pattern
                            .captures(line)
                            .is_some_and(|caps| deny.is_denied(caps[1].trim_matches(|c| c == '`' || c == '*')));
                    }
                    if !skipping {
                        kept.push(line);
                    }
                }
                kept.join("\n")
            }
            RuleAction::RemoveUntilNextMarker => {
                let lines: Vec<&str> = text.split('\n').collect();
                let mut kept = Vec::new();
                let mut skipping = false;
                let mut previous_blank = true;
                for (i, line) in lines.iter().enumerate() {
                    if skipping && is_file_marker(line) {
                        skipping = false;
                    }
                    if !skipping && previous_blank && self.pattern.is_match(line) {
                        // Only trailing prose goes; an opener followed by code stays
                        skipping = !lines[i + 1..]
                            .iter()
                            .take_while(|rest| !is_file_marker(rest))
                            .any(|rest| looks_like_code(rest));
                    }
                    if !skipping {
                        kept.push(*line);
                    }
                    previous_blank = line.trim().is_empty();
                }
                kept.join("\n")
            }
        }
    }
}

/// Applies the narration rules in order
#[derive(Debug, Clone)]
pub struct NarrationStripper {
    rules: Vec<NarrationRule>,
    deny: DenyList,
}

impl NarrationStripper {
    /// Stripper with the standard rule order
    pub fn new(deny: DenyList) -> Self {
        Self {
            rules: vec![
                NarrationRule::fence_delimiters(),
                NarrationRule::denied_boundary_blocks(),
                NarrationRule::denied_heading_sections(),
                NarrationRule::explanatory_paragraphs(),
            ],
            deny,
        }
    }

    /// Stripper for a single generated test file: fences, HTML comments
    /// and prose lines
    pub fn for_tests() -> Self {
        Self {
            rules: vec![
                NarrationRule::fence_delimiters(),
                NarrationRule::html_comments(),
                NarrationRule::test_narration_lines(),
            ],
            deny: DenyList::default(),
        }
    }

    /// Rules in application order
    pub fn rules(&self) -> &[NarrationRule] {
        &self.rules
    }

    /// Normalize line endings, apply every rule and trim the result
    pub fn strip(&self, response: &str) -> String {
        let mut text = response.replace("\r\n", "\n");
        for rule in &self.rules {
            let before = text.len();
            text = rule.apply(&text, &self.deny);
            if text.len() != before {
                debug!("Narration rule '{}' removed {} bytes", rule.name(), before.saturating_sub(text.len()));
            }
        }
        text.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaterializerConfig;

    fn deny() -> DenyList {
        MaterializerConfig::default().deny_list()
    }

    #[test]
    fn test_fence_delimiters() {
        let text = "```python\nprint('hi')\n```\n  ```\nx = 1";
        let stripped = NarrationRule::fence_delimiters().apply(text, &deny());
        assert_eq!(stripped, "print('hi')\nx = 1");
    }

    #[test]
    fn test_fence_inside_code_line_is_kept() {
        let text = "doc = \"```json\"";
        assert_eq!(NarrationRule::fence_delimiters().apply(text, &deny()), text);
    }

    #[test]
    fn test_denied_boundary_blocks() {
        let text = "=== FILE: requirements.txt ===\nflask\n=== END FILE ===\n=== FILE: app.py ===\nX\n=== END FILE ===\n";
        let stripped = NarrationRule::denied_boundary_blocks().apply(text, &deny());
        assert_eq!(stripped, "=== FILE: app.py ===\nX\n=== END FILE ===\n");
    }

    #[test]
    fn test_denied_heading_sections() {
        let text = "#### app.py\nX\n#### README.md\n# Title\nprose\n#### models/user.py\nY";
        let stripped = NarrationRule::denied_heading_sections().apply(text, &deny());
        assert_eq!(stripped, "#### app.py\nX\n#### models/user.py\nY");
    }

    #[test]
    fn test_explanatory_paragraph_cut_to_next_marker() {
        let text = "#### app.py\nX\n\nThis implementation uses Flask.\nIt is great.\n#### models/user.py\nY\n\nThis ensures clean code.";
        let stripped = NarrationRule::explanatory_paragraphs().apply(text, &deny());
        assert_eq!(stripped, "#### app.py\nX\n\n#### models/user.py\nY\n");
    }

    #[test]
    fn test_explanatory_opener_mid_paragraph_is_kept() {
        let text = "x = 1\nThis implementation detail stays";
        assert_eq!(NarrationRule::explanatory_paragraphs().apply(text, &deny()), text);
    }

    #[test]
    fn test_opener_inside_docstring_keeps_file_body() {
        let text = "#### models/user.py\n\"\"\"User model.\n\nThis implementation keeps users.\n\"\"\"\nfrom app import db\n\nclass User(db.Model):\n    pass\n#### app.py\nX";
        assert_eq!(NarrationRule::explanatory_paragraphs().apply(text, &deny()), text);
    }

    #[test]
    fn test_opener_followed_by_code_is_kept() {
        let text = "#### app.js\n// setup\n\nThis creates the server\nconst app = express();\napp.listen(3000);";
        assert_eq!(NarrationRule::explanatory_paragraphs().apply(text, &deny()), text);
    }

    #[test]
    fn test_looks_like_code() {
        assert!(looks_like_code("from app import db"));
        assert!(looks_like_code("    return x"));
        assert!(looks_like_code("\"\"\""));
        assert!(looks_like_code("app.listen(3000);"));
        assert!(looks_like_code("x = 1"));
        assert!(!looks_like_code("It is great."));
        assert!(!looks_like_code("- Routes live in controllers."));
        assert!(!looks_like_code(""));
    }

    #[test]
    fn test_unknown_trailing_prose_is_kept() {
        let text = "#### app.py\nX\n\nHope this helps!";
        assert_eq!(NarrationRule::explanatory_paragraphs().apply(text, &deny()), text);
    }

    #[test]
    fn test_test_stripper_removes_prose_but_keeps_code() {
        let response = "Here is the test code:\n```python\nimport pytest\n<!-- generated -->\nfrom app import app\n\nNote = 'kept'\ndef test_index():\n    assert True\n```\nNote: run with pytest.\nThis test assumes a database.";
        let stripped = NarrationStripper::for_tests().strip(response);
        assert_eq!(
            stripped,
            "import pytest\n\nfrom app import app\n\nNote = 'kept'\ndef test_index():\n    assert True"
        );
    }

    #[test]
    fn test_stripper_normalizes_line_endings_and_orders_rules() {
        let stripper = NarrationStripper::new(deny());
        let names: Vec<_> = stripper.rules().iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec![
                "fence-delimiters",
                "denied-boundary-blocks",
                "denied-heading-sections",
                "explanatory-paragraphs"
            ]
        );

        let stripped = stripper.strip("```\r\n#### app.py\r\nX\r\n```\r\n\r\nThis code provides an app.\r\n");
        assert_eq!(stripped, "#### app.py\nX");
    }
}
