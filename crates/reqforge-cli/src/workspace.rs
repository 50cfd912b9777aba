//! The working set behind every command: one provider, one current session.

use crate::error::{CliError, Result};
use reqforge_domain::FunctionalityRecord;
use reqforge_extractor::{ContentType, DocumentAggregator, ExtractionReport, ExtractorConfig};
use reqforge_index::{Indexer, Session};
use reqforge_llm::LlmProvider;
use reqforge_materializer::{
    collect_sources, test_file_path, CodeGenerator, Materialization, Materializer, MaterializerConfig, TargetLanguage,
    TestGenerator,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Pipeline stages sharing one provider, plus the current session.
///
/// Each ingest replaces the session wholesale; a failed ingest leaves the
/// previous one in place.
pub struct Workspace<P: LlmProvider> {
    aggregator: DocumentAggregator<P>,
    indexer: Indexer<P>,
    generator: CodeGenerator<P>,
    test_generator: TestGenerator<P>,
    materializer: Materializer,
    session: Option<Session>,
    last_report: Option<ExtractionReport>,
}

impl<P: LlmProvider> Workspace<P> {
    /// Create a workspace with no document loaded
    pub fn new(provider: Arc<P>, extractor: ExtractorConfig, materializer: MaterializerConfig) -> Self {
        let generator = CodeGenerator::new(provider.clone()).with_deny_list(materializer.deny_list.clone());

        Self {
            aggregator: DocumentAggregator::new(provider.clone(), extractor),
            indexer: Indexer::new(provider.clone()),
            generator,
            test_generator: TestGenerator::new(provider),
            materializer: Materializer::new(materializer),
            session: None,
            last_report: None,
        }
    }

    /// Read, extract and index the document at `path`.
    ///
    /// The content type is inferred from the extension unless given.
    pub async fn ingest(&mut self, path: &Path, content_type: Option<ContentType>) -> Result<&Session> {
        let raw = tokio::fs::read(path).await?;
        let content_type = content_type.unwrap_or_else(|| ContentType::from_path(path));
        let source_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.ingest_bytes(&source_name, &raw, content_type).await
    }

    /// Extract and index an in-memory document
    pub async fn ingest_bytes(&mut self, source_name: &str, raw: &[u8], content_type: ContentType) -> Result<&Session> {
        info!("Ingesting {} ({}, {} bytes)", source_name, content_type, raw.len());

        let report = self.aggregator.process_document_with_report(raw, content_type).await?;
        let index = self.indexer.index(report.records.clone()).await;
        info!(
            "Indexed {} functionalities ({} embedded)",
            index.len(),
            index.embedded_count()
        );

        self.last_report = Some(report);
        Ok(&*self.session.insert(Session::new(source_name, index)))
    }

    /// Current session, if a document has been ingested
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Current session or [`CliError::NoSession`]
    pub fn require_session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(CliError::NoSession)
    }

    /// Accounting for the last successful ingest
    pub fn last_report(&self) -> Option<&ExtractionReport> {
        self.last_report.as_ref()
    }

    /// First record whose name contains `name`, case-insensitively
    pub fn find(&self, name: &str) -> Result<&FunctionalityRecord> {
        self.require_session()?
            .index()
            .find_by_name(name)
            .ok_or_else(|| CliError::NotFound(name.to_string()))
    }

    /// Generate code for the record matching `name`
    pub async fn generate(&self, name: &str, language: TargetLanguage) -> Result<String> {
        let record = self.find(name)?;
        Ok(self.generator.generate(record, language).await?)
    }

    /// Write a generation response under `target_dir`
    pub async fn materialize(&self, response: &str, target_dir: &Path) -> Result<Materialization> {
        Ok(self.materializer.materialize(response, target_dir).await?)
    }

    /// Generate a test file for the record matching `name` against the
    /// project already written in `project_dir`, and write it there
    pub async fn generate_tests(
        &self,
        name: &str,
        language: TargetLanguage,
        project_dir: &Path,
    ) -> Result<Materialization> {
        let record = self.find(name)?;
        let sources = collect_sources(project_dir).await?;
        if sources.is_empty() {
            warn!(
                "No source files in {}; generating tests from the functionality alone",
                project_dir.display()
            );
        }

        let response = self.test_generator.generate(record, language, &sources).await?;
        let test_path = test_file_path(&record.name, language);
        Ok(self
            .materializer
            .materialize_tests(&response, &test_path, project_dir)
            .await?)
    }

    /// Project directory under `base` for the current session
    pub fn project_dir(&self, base: &Path) -> PathBuf {
        let project = self
            .session
            .as_ref()
            .map(Session::project_name)
            .unwrap_or(reqforge_index::DEFAULT_PROJECT_NAME);
        base.join(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqforge_llm::MockProvider;

    const RECORDS: &str = r#"[
        {"name": "Student Registration", "description": "Register students"},
        {"name": "Course Catalog", "description": "Browse courses"}
    ]"#;

    const DOCUMENT: &str = "The system shall let students register for an account using their university email address. \
        The system shall let students browse the course catalog and filter courses by department.";

    fn workspace(provider: MockProvider) -> Workspace<MockProvider> {
        Workspace::new(Arc::new(provider), ExtractorConfig::default(), MaterializerConfig::default())
    }

    #[tokio::test]
    async fn test_ingest_creates_session() {
        let mut ws = workspace(MockProvider::new(RECORDS));

        let session = ws
            .ingest_bytes("Library SRS.txt", DOCUMENT.as_bytes(), ContentType::PlainText)
            .await
            .unwrap();

        assert_eq!(session.project_name(), "library_srs");
        assert_eq!(session.index().len(), 2);
        assert_eq!(ws.find("catalog").unwrap().name, "Course Catalog");
        assert!(ws.last_report().is_some());
    }

    #[tokio::test]
    async fn test_failed_ingest_keeps_previous_session() {
        let provider = MockProvider::new(RECORDS);
        let mut ws = workspace(provider.clone());
        ws.ingest_bytes("first.txt", DOCUMENT.as_bytes(), ContentType::PlainText)
            .await
            .unwrap();

        provider.push_response("[]");
        let result = ws
            .ingest_bytes("second.txt", DOCUMENT.as_bytes(), ContentType::PlainText)
            .await;

        assert!(matches!(
            result,
            Err(CliError::Extractor(reqforge_extractor::ExtractorError::NoFunctionalityFound))
        ));
        assert_eq!(ws.require_session().unwrap().source_name(), "first.txt");
    }

    #[tokio::test]
    async fn test_lookup_without_session() {
        let ws = workspace(MockProvider::default());
        assert!(matches!(ws.find("anything"), Err(CliError::NoSession)));
        assert_eq!(ws.project_dir(Path::new("out")), PathBuf::from("out").join("srs-project"));
    }

    #[tokio::test]
    async fn test_generate_tests_reads_the_project() {
        let provider = MockProvider::new(RECORDS);
        provider.when_prompt_contains("CODE TO TEST", "from app import app\n\ndef test_register():\n    assert app");
        let mut ws = workspace(provider.clone());
        ws.ingest_bytes("srs.txt", DOCUMENT.as_bytes(), ContentType::PlainText)
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.py"), "app = Flask(__name__)").unwrap();

        let result = ws
            .generate_tests("registration", TargetLanguage::Python, dir.path())
            .await
            .unwrap();

        let test_path = PathBuf::from("tests").join("student_registration_test.py");
        assert_eq!(result.written, vec![test_path.clone()]);
        assert!(std::fs::read_to_string(dir.path().join(test_path))
            .unwrap()
            .starts_with("from app import app"));
        assert!(provider.prompts().last().unwrap().contains("=== FILE: app.py ==="));
    }

    #[tokio::test]
    async fn test_generate_unknown_name() {
        let mut ws = workspace(MockProvider::new(RECORDS));
        ws.ingest_bytes("srs.txt", DOCUMENT.as_bytes(), ContentType::PlainText)
            .await
            .unwrap();

        let err = ws.generate("Payroll", TargetLanguage::Python).await.unwrap_err();
        assert!(matches!(err, CliError::NotFound(name) if name == "Payroll"));
    }
}
