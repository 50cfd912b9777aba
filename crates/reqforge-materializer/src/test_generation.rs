//! Test generation for a functionality record and its generated code

use crate::error::MaterializeError;
use crate::file::GeneratedFile;
use crate::generation::TargetLanguage;
use crate::strategy::has_known_extension;
use reqforge_domain::FunctionalityRecord;
use reqforge_llm::{CompletionOptions, LlmProvider};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

/// System message sent with every test generation call
pub const TEST_SYSTEM_PROMPT: &str = "You are an expert software tester. Write tests that import the existing project code and never duplicate it. Return only executable test code.";

/// Upper bound on the test prompt, in bytes; the code section is cut to fit
pub const MAX_TEST_PROMPT_CHARS: usize = 50_000;

const TRUNCATION_NOTE: &str = "\n[Code truncated]";

/// Directories never read as project sources
const SKIPPED_DIRS: &[&str] = &[
    "tests",
    "__tests__",
    "node_modules",
    "__pycache__",
    "venv",
    ".venv",
    ".git",
    "target",
    "bin",
    "obj",
];

impl TargetLanguage {
    /// Test framework the generated tests use
    pub fn test_framework(&self) -> &'static str {
        match self {
            TargetLanguage::Python => "pytest",
            TargetLanguage::JavaScript => "jest",
            TargetLanguage::Java => "junit",
            TargetLanguage::CSharp => "xunit",
        }
    }
}

fn snake_case(name: &str) -> String {
    let snake: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if snake.trim_matches('_').is_empty() {
        "functionality".to_string()
    } else {
        snake
    }
}

fn pascal_case(name: &str) -> String {
    let pascal: String = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars
                .next()
                .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
                .unwrap_or_default()
        })
        .collect();
    if pascal.is_empty() {
        "Functionality".to_string()
    } else {
        pascal
    }
}

/// Relative path of the test file for `record_name`.
///
/// JavaScript tests go under `__tests__/`, every other language under
/// `tests/`. Java and C# names are PascalCase so the class matches the file.
///
/// ```
/// use reqforge_materializer::{test_file_path, TargetLanguage};
/// use std::path::PathBuf;
///
/// assert_eq!(
///     test_file_path("User Login", TargetLanguage::Python),
///     PathBuf::from("tests").join("user_login_test.py")
/// );
/// assert_eq!(
///     test_file_path("User Login", TargetLanguage::Java),
///     PathBuf::from("tests").join("UserLoginTest.java")
/// );
/// ```
pub fn test_file_path(record_name: &str, language: TargetLanguage) -> PathBuf {
    let (dir, file) = match language {
        TargetLanguage::Python => ("tests", format!("{}_test.py", snake_case(record_name))),
        TargetLanguage::JavaScript => ("__tests__", format!("{}.test.js", snake_case(record_name))),
        TargetLanguage::Java => ("tests", format!("{}Test.java", pascal_case(record_name))),
        TargetLanguage::CSharp => ("tests", format!("{}Tests.cs", pascal_case(record_name))),
    };
    PathBuf::from(dir).join(file)
}

/// Render files as `=== FILE: <path> ===` blocks for a prompt
pub fn render_sources(files: &[GeneratedFile]) -> String {
    files
        .iter()
        .map(|f| format!("=== FILE: {} ===\n{}\n=== END FILE ===", f.display_path(), f.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Read the source files of a generated project.
///
/// Walks `project_dir` for files with a known extension, skipping test,
/// dependency and build directories. Files that are not UTF-8 are skipped.
/// Results are sorted by path; a missing directory yields no files.
pub async fn collect_sources(project_dir: &Path) -> Result<Vec<GeneratedFile>, MaterializeError> {
    let mut files = Vec::new();
    if !fs::try_exists(project_dir)
        .await
        .map_err(|e| MaterializeError::io(project_dir, e))?
    {
        return Ok(files);
    }

    let mut pending = vec![project_dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir).await.map_err(|e| MaterializeError::io(&dir, e))?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| MaterializeError::io(&dir, e))? {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(|e| MaterializeError::io(&path, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();

            if file_type.is_dir() {
                if !SKIPPED_DIRS.contains(&name.as_str()) {
                    pending.push(path);
                }
                continue;
            }

            let Ok(relative) = path.strip_prefix(project_dir) else {
                continue;
            };
            let relative = crate::file::display_path(relative);
            if !has_known_extension(&relative) {
                continue;
            }
            match fs::read_to_string(&path).await {
                Ok(content) => files.extend(GeneratedFile::new(&relative, &content)),
                Err(e) => debug!("Skipping unreadable source {}: {}", relative, e),
            }
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Cut `code` to at most `budget` bytes, preferring the start of the last
/// file block when it sits in the final fifth
fn truncate_code(code: &str, budget: usize) -> String {
    if code.len() <= budget {
        return code.to_string();
    }
    let budget = budget.saturating_sub(TRUNCATION_NOTE.len());
    let mut end = budget;
    while !code.is_char_boundary(end) {
        end -= 1;
    }
    let cut = &code[..end];
    let cut = match cut.rfind("=== FILE:") {
        Some(marker) if marker * 5 > budget * 4 => &cut[..marker],
        _ => cut,
    };
    format!("{}{}", cut.trim_end(), TRUNCATION_NOTE)
}

/// Build the test generation prompt for `record` and its project sources
pub fn build_test_prompt(record: &FunctionalityRecord, language: TargetLanguage, sources: &str) -> String {
    let test_path = crate::file::display_path(&test_file_path(&record.name, language));

    let mut head = format!(
        "Generate {} tests for the following functionality in {}.\n\n",
        language.test_framework(),
        language.to_string().to_uppercase()
    );
    head.push_str(&format!("FUNCTIONALITY: {}\n", record.name));
    if !record.description.trim().is_empty() {
        head.push_str(&format!("DESCRIPTION: {}\n", record.description));
    }
    if !record.context.trim().is_empty() {
        head.push_str(&format!("CONTEXT: {}\n", record.context));
    }
    if !record.use_cases.is_empty() {
        head.push_str(&format!("USE CASES: {}\n", record.use_cases.join("; ")));
    }
    if !record.requirements.is_empty() {
        head.push_str(&format!("REQUIREMENTS: {}\n", record.requirements.join("; ")));
    }

    let mut tail = String::from("\nTEST RULES:\n");
    tail.push_str("- Import from the project files above; never copy or recreate their code\n");
    tail.push_str("- Only test routes, classes and functions that exist in the code above\n");
    tail.push_str("- Cover every requirement, including invalid input and edge cases\n");
    tail.push_str("- Create fixtures and mock data inside the test file\n");
    match language {
        TargetLanguage::Python => tail.push_str(
            "- The file lives in tests/: insert the project root into sys.path before importing project modules\n",
        ),
        TargetLanguage::Java | TargetLanguage::CSharp => {
            let class = test_path
                .rsplit('/')
                .next()
                .and_then(|file| file.split('.').next())
                .unwrap_or_default();
            tail.push_str(&format!("- The public test class MUST be named {}\n", class));
        }
        TargetLanguage::JavaScript => {}
    }
    tail.push_str(&format!("\nTEST FILE: {}\n", test_path));
    tail.push_str("Return ONLY the test code, starting with imports. No explanations, notes or markdown.");

    let mut prompt = head;
    if !sources.trim().is_empty() {
        let budget = MAX_TEST_PROMPT_CHARS.saturating_sub(prompt.len() + tail.len() + "\nCODE TO TEST:\n\n".len());
        let code = truncate_code(sources, budget);
        if code.len() < sources.len() {
            warn!("Project code truncated to fit the test prompt");
        }
        prompt.push_str(&format!("\nCODE TO TEST:\n{}\n", code));
    }
    prompt.push_str(&tail);
    prompt
}

/// Asks the completion service for one record's test file
pub struct TestGenerator<P: LlmProvider> {
    provider: Arc<P>,
    options: CompletionOptions,
}

impl<P: LlmProvider> TestGenerator<P> {
    /// Create a generator with test completion options
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            options: CompletionOptions {
                max_tokens: 3000,
                ..CompletionOptions::default()
            }
            .with_system_prompt(TEST_SYSTEM_PROMPT),
        }
    }

    /// Use these completion options
    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    /// Generate the raw test response for `record` against `sources`.
    ///
    /// One completion call; an empty `sources` still generates tests from
    /// the record alone.
    pub async fn generate(
        &self,
        record: &FunctionalityRecord,
        language: TargetLanguage,
        sources: &[GeneratedFile],
    ) -> Result<String, MaterializeError> {
        self.provider.check_credentials()?;

        let prompt = build_test_prompt(record, language, &render_sources(sources));
        info!(
            "Generating {} tests for '{}' from {} source files",
            language.test_framework(),
            record.name,
            sources.len()
        );

        let response = self.provider.complete(&prompt, &self.options).await?;
        info!("Received {} bytes of test code", response.len());
        Ok(response)
    }
}
