//! Code generation for a single functionality record

use crate::error::MaterializeError;
use reqforge_domain::FunctionalityRecord;
use reqforge_llm::{CompletionOptions, LlmProvider};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// System message sent with every generation call
pub const GENERATION_SYSTEM_PROMPT: &str =
    "You are an expert software engineer. Generate complete, working source files in the requested layout.";

/// Target language of a generated project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetLanguage {
    /// Flask with MVC layout
    #[default]
    Python,
    /// Express with MVC layout
    JavaScript,
    /// Spring Boot
    Java,
    /// ASP.NET Core MVC
    CSharp,
}

impl TargetLanguage {
    fn layout(&self) -> &'static str {
        match self {
            TargetLanguage::Python => {
                "- app.py (Flask main app, in the root directory)\n- models/ (model files)\n- views/ (view files)\n- controllers/ (controller files)\n- templates/ (HTML templates)"
            }
            TargetLanguage::JavaScript => {
                "- app.js (Express entry point, in the root directory)\n- models/ (model files)\n- views/ (view templates)\n- controllers/ (controller files)\n- routes/ (route definitions)"
            }
            TargetLanguage::Java => {
                "- src/main/java/com/example/entity/ (JPA entities)\n- src/main/java/com/example/repository/ (repositories)\n- src/main/java/com/example/service/ (services)\n- src/main/java/com/example/controller/ (controllers)"
            }
            TargetLanguage::CSharp => {
                "- Program.cs (entry point)\n- Models/ (model classes)\n- Views/ (Razor views)\n- Controllers/ (controllers)"
            }
        }
    }

    fn conventions(&self) -> Option<&'static str> {
        match self {
            TargetLanguage::Python => Some(
                "DATABASE CONVENTIONS:\n- Use Flask-SQLAlchemy: `from flask_sqlalchemy import SQLAlchemy` and `db = SQLAlchemy()` in app.py\n- Models import db with `from app import db` and subclass `db.Model`\n- Do not create config/database.py with a declarative Base",
            ),
            _ => None,
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetLanguage::Python => "python",
            TargetLanguage::JavaScript => "javascript",
            TargetLanguage::Java => "java",
            TargetLanguage::CSharp => "csharp",
        };
        f.write_str(name)
    }
}

impl FromStr for TargetLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "python" | "py" => Ok(TargetLanguage::Python),
            "javascript" | "js" | "node" => Ok(TargetLanguage::JavaScript),
            "java" => Ok(TargetLanguage::Java),
            "csharp" | "c#" | "cs" => Ok(TargetLanguage::CSharp),
            other => Err(format!(
                "Unknown language '{}' (expected python, javascript, java or csharp)",
                other
            )),
        }
    }
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "- (none)".to_string();
    }
    items.iter().map(|item| format!("- {}", item)).collect::<Vec<_>>().join("\n")
}

/// Build the generation prompt for `record`
pub fn build_generation_prompt(record: &FunctionalityRecord, language: TargetLanguage, deny: &[String]) -> String {
    let mut prompt = format!(
        "Generate a {} implementation of the following functionality.\n\n",
        language.to_string().to_uppercase()
    );

    prompt.push_str(&format!("FUNCTIONALITY: {}\n", record.name));
    prompt.push_str(&format!("DESCRIPTION: {}\n", record.description));
    if !record.context.trim().is_empty() {
        prompt.push_str(&format!("CONTEXT: {}\n", record.context));
    }
    prompt.push_str(&format!("\nUSE CASES:\n{}\n", bullet_list(&record.use_cases)));
    prompt.push_str(&format!("\nREQUIREMENTS:\n{}\n", bullet_list(&record.requirements)));
    if !record.activity_diagrams.is_empty() {
        prompt.push_str(&format!("\nWORKFLOWS:\n{}\n", bullet_list(&record.activity_diagrams)));
    }
    if !record.dependencies.is_empty() {
        prompt.push_str(&format!("\nDEPENDS ON:\n{}\n", bullet_list(&record.dependencies)));
    }

    prompt.push_str(&format!("\nPROJECT LAYOUT:\n{}\n", language.layout()));
    if let Some(conventions) = language.conventions() {
        prompt.push_str(&format!("\n{}\n", conventions));
    }
    if !deny.is_empty() {
        prompt.push_str(&format!("\nDO NOT GENERATE: {}\n", deny.join(", ")));
    }

    prompt.push_str("\nOUTPUT FORMAT:\nPrefix every file with a heading line naming its relative path, followed by the file content:\n\n#### filename.ext\n<content>\n\n#### dir/filename2.ext\n<content>\n\n");
    prompt.push_str("Return ONLY code files in the #### filename format. Do not include explanations or any text after the code.");

    prompt
}

/// Asks the completion service for one record's implementation
pub struct CodeGenerator<P: LlmProvider> {
    provider: Arc<P>,
    options: CompletionOptions,
    deny: Vec<String>,
}

impl<P: LlmProvider> CodeGenerator<P> {
    /// Create a generator with default completion options
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            options: CompletionOptions::default().with_system_prompt(GENERATION_SYSTEM_PROMPT),
            deny: Vec::new(),
        }
    }

    /// Use these completion options
    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    /// Ask the model not to emit these files
    pub fn with_deny_list(mut self, deny: Vec<String>) -> Self {
        self.deny = deny;
        self
    }

    /// Generate the raw response for `record`.
    ///
    /// One completion call; the response is returned untouched for the
    /// materializer to parse.
    pub async fn generate(&self, record: &FunctionalityRecord, language: TargetLanguage) -> Result<String, MaterializeError> {
        self.provider.check_credentials()?;

        let prompt = build_generation_prompt(record, language, &self.deny);
        info!("Generating {} code for '{}'", language, record.name);

        let response = self.provider.complete(&prompt, &self.options).await?;
        info!("Received {} bytes of generated code", response.len());
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqforge_llm::{LlmError, MockProvider};

    fn record() -> FunctionalityRecord {
        let mut record = FunctionalityRecord::new("Student Registration", "Register students for courses");
        record.use_cases = vec!["Student signs up".to_string()];
        record.requirements = vec!["Email must be unique".to_string()];
        record
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!("Python".parse::<TargetLanguage>(), Ok(TargetLanguage::Python));
        assert_eq!("js".parse::<TargetLanguage>(), Ok(TargetLanguage::JavaScript));
        assert_eq!("C#".parse::<TargetLanguage>(), Ok(TargetLanguage::CSharp));
        assert!("cobol".parse::<TargetLanguage>().is_err());
        assert_eq!(TargetLanguage::default(), TargetLanguage::Python);
    }

    #[test]
    fn test_prompt_contents() {
        let prompt = build_generation_prompt(&record(), TargetLanguage::Python, &["README.md".to_string()]);

        assert!(prompt.contains("FUNCTIONALITY: Student Registration"));
        assert!(prompt.contains("- Email must be unique"));
        assert!(prompt.contains("#### filename.ext"));
        assert!(prompt.contains("flask_sqlalchemy"));
        assert!(prompt.contains("DO NOT GENERATE: README.md"));
    }

    #[test]
    fn test_java_prompt_has_no_flask_hint() {
        let prompt = build_generation_prompt(&record(), TargetLanguage::Java, &[]);
        assert!(prompt.contains("src/main/java/com/example/entity/"));
        assert!(!prompt.contains("flask_sqlalchemy"));
        assert!(!prompt.contains("DO NOT GENERATE"));
    }

    #[tokio::test]
    async fn test_generate_returns_response_untouched() {
        let provider = Arc::new(MockProvider::new("#### app.py\nX"));
        let generator = CodeGenerator::new(provider.clone());

        let response = generator.generate(&record(), TargetLanguage::Python).await.unwrap();

        assert_eq!(response, "#### app.py\nX");
        assert_eq!(provider.completion_calls(), 1);
        assert!(provider.prompts()[0].contains("Student Registration"));
    }

    #[tokio::test]
    async fn test_generate_without_credentials() {
        let provider = Arc::new(MockProvider::default().without_credentials());
        let generator = CodeGenerator::new(provider.clone());

        let err = generator.generate(&record(), TargetLanguage::Python).await.unwrap_err();

        assert!(matches!(err, MaterializeError::AuthenticationMissing));
        assert_eq!(provider.completion_calls(), 0);
    }

    #[tokio::test]
    async fn test_generate_service_failure() {
        let provider = Arc::new(MockProvider::default());
        provider.push_error(LlmError::RateLimitExceeded);
        let generator = CodeGenerator::new(provider);

        let err = generator.generate(&record(), TargetLanguage::Python).await.unwrap_err();
        assert!(matches!(err, MaterializeError::TransientService(_)));
    }
}
