//! Dominant-language detection from lexical signals

use std::fmt;

/// Language families the layout strategy knows how to split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// Python, including Django and Flask projects
    Python,
    /// JavaScript / Node.js
    JavaScript,
    /// Java
    Java,
    /// C# / ASP.NET
    CSharp,
    /// No signal found
    Unknown,
}

impl Language {
    /// Source file extensions of the language
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["py"],
            Language::JavaScript => &["js", "mjs", "jsx", "ts"],
            Language::Java => &["java"],
            Language::CSharp => &["cs", "cshtml"],
            Language::Unknown => &[],
        }
    }

    /// Line-comment prefixes that may introduce a path marker
    pub fn comment_prefixes(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["#"],
            Language::JavaScript | Language::Java | Language::CSharp => &["//"],
            Language::Unknown => &[],
        }
    }

    /// Directory used for bare file names, if the language has a
    /// conventional source root
    pub fn default_source_dir(&self) -> Option<&'static str> {
        match self {
            Language::Java => Some("src/main/java/com/example"),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Candidates in tie-break order
const CANDIDATES: [Language; 4] = [Language::Python, Language::JavaScript, Language::Java, Language::CSharp];

fn signals(language: Language) -> &'static [(&'static str, u32)] {
    match language {
        Language::Python => &[
            ("from django", 3),
            ("models.Model", 3),
            ("def __str__", 2),
            ("from flask", 3),
            ("def ", 2),
            ("self.", 1),
            ("if __name__", 2),
        ],
        Language::JavaScript => &[
            ("import express", 3),
            ("const express", 3),
            ("module.exports", 3),
            ("require(", 2),
            ("=> {", 1),
            ("const ", 1),
        ],
        Language::Java => &[
            ("@Entity", 3),
            ("@Controller", 2),
            ("@RestController", 3),
            ("@Service", 3),
            ("import java", 3),
            ("package ", 2),
            ("public class", 1),
        ],
        Language::CSharp => &[
            ("using Microsoft", 3),
            ("using System", 3),
            ("[HttpPost]", 3),
            ("[HttpGet]", 3),
            ("namespace ", 2),
            ("public class", 1),
        ],
        Language::Unknown => &[],
    }
}

/// Weighted signal score of `language` in `text`
pub fn score(text: &str, language: Language) -> u32 {
    signals(language)
        .iter()
        .filter(|(needle, _)| text.contains(needle))
        .map(|(_, weight)| weight)
        .sum()
}

/// Classify the dominant language of `text`.
///
/// Each present signal adds its weight once. The highest score wins; ties
/// go to the earlier of Python, JavaScript, Java, C#.
pub fn detect_language(text: &str) -> Language {
    let mut best = Language::Unknown;
    let mut best_score = 0;
    for language in CANDIDATES {
        let s = score(text, language);
        if s > best_score {
            best = language;
            best_score = s;
        }
    }
    best
}
