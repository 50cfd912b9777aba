//! Command-level workflows against a scripted provider

use reqforge_cli::cli::{ExtractArgs, GenerateArgs, LanguageArg, MaterializeArgs, TestsArgs};
use reqforge_cli::commands::{execute_extract, execute_generate, execute_materialize, execute_tests};
use reqforge_cli::config::OutputFormat;
use reqforge_cli::{CliError, Config, Formatter, Workspace};
use reqforge_domain::FunctionalityRecord;
use reqforge_llm::MockProvider;
use std::fs;
use std::sync::Arc;

const RECORDS: &str = r#"```json
[
  {"name": "Book Checkout", "description": "Members borrow books", "useCases": ["Borrow a book"]},
  {"name": "Fine Calculation", "description": "Compute overdue fines"}
]
```"#;

const DOCUMENT: &str = "Library Management System\n\n\
    1. Members shall be able to check out up to five books at a time.\n\
    2. The system shall compute fines for overdue books at a fixed daily rate.\n";

const GENERATED: &str = "#### app.py\n```python\nfrom flask import Flask\napp = Flask(__name__)\n```\n\n#### models/loan.py\nfrom app import db\n\nclass Loan(db.Model):\n    pass\n\nThis implementation follows MVC.";

const GENERATED_TESTS: &str = "Here are the tests:\n```python\nfrom app import app\n\ndef test_checkout():\n    assert app.test_client() is not None\n```";

fn setup() -> (MockProvider, Workspace<MockProvider>, Formatter) {
    let provider = MockProvider::default();
    provider.when_prompt_contains("REQUIREMENTS TEXT CHUNK", RECORDS);
    provider.when_prompt_contains("CODE TO TEST", GENERATED_TESTS);
    provider.when_prompt_contains("FUNCTIONALITY: Book Checkout", GENERATED);

    let config = Config::default();
    let workspace = Workspace::new(
        Arc::new(provider.clone()),
        config.extractor.clone(),
        config.materializer.clone(),
    );
    (provider, workspace, Formatter::new(OutputFormat::Quiet, false))
}

#[tokio::test]
async fn test_extract_saves_records_without_embeddings() {
    let dir = tempfile::tempdir().unwrap();
    let document = dir.path().join("library.txt");
    fs::write(&document, DOCUMENT).unwrap();
    let save = dir.path().join("out").join("records.json");

    let (provider, mut workspace, formatter) = setup();
    execute_extract(
        ExtractArgs {
            document,
            content_type: None,
            save: Some(save.clone()),
        },
        &mut workspace,
        &formatter,
    )
    .await
    .unwrap();

    let saved: Vec<FunctionalityRecord> = serde_json::from_str(&fs::read_to_string(&save).unwrap()).unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].name, "Book Checkout");
    assert_eq!(saved[0].use_cases, vec!["Borrow a book"]);
    assert!(saved.iter().all(|r| r.embedding.is_none()));

    assert_eq!(provider.completion_calls(), 1);
    assert_eq!(provider.embed_calls(), 2);
    assert_eq!(workspace.session().unwrap().project_name(), "library");
}

#[tokio::test]
async fn test_generate_writes_project() {
    let dir = tempfile::tempdir().unwrap();
    let document = dir.path().join("library.md");
    fs::write(&document, DOCUMENT).unwrap();
    let out = dir.path().join("project");

    let (_provider, mut workspace, formatter) = setup();
    execute_generate(
        GenerateArgs {
            document,
            name: "checkout".to_string(),
            language: Some(LanguageArg::Python),
            out: Some(out.clone()),
            content_type: None,
        },
        &mut workspace,
        &Config::default(),
        &formatter,
    )
    .await
    .unwrap();

    assert_eq!(
        fs::read_to_string(out.join("app.py")).unwrap(),
        "from flask import Flask\napp = Flask(__name__)"
    );
    let model = fs::read_to_string(out.join("models").join("loan.py")).unwrap();
    assert!(model.ends_with("class Loan(db.Model):\n    pass"));
    assert!(!out.join("config").exists());
}

#[tokio::test]
async fn test_tests_written_into_generated_project() {
    let dir = tempfile::tempdir().unwrap();
    let document = dir.path().join("library.md");
    fs::write(&document, DOCUMENT).unwrap();
    let out = dir.path().join("project");

    let (provider, mut workspace, formatter) = setup();
    execute_generate(
        GenerateArgs {
            document: document.clone(),
            name: "checkout".to_string(),
            language: Some(LanguageArg::Python),
            out: Some(out.clone()),
            content_type: None,
        },
        &mut workspace,
        &Config::default(),
        &formatter,
    )
    .await
    .unwrap();

    execute_tests(
        TestsArgs {
            document,
            name: "checkout".to_string(),
            language: Some(LanguageArg::Python),
            project: Some(out.clone()),
            content_type: None,
        },
        &mut workspace,
        &Config::default(),
        &formatter,
    )
    .await
    .unwrap();

    let tests = fs::read_to_string(out.join("tests").join("book_checkout_test.py")).unwrap();
    assert_eq!(tests, "from app import app\n\ndef test_checkout():\n    assert app.test_client() is not None");

    let prompt = provider.prompts().last().unwrap().clone();
    assert!(prompt.contains("=== FILE: app.py ==="));
    assert!(prompt.contains("=== FILE: models/loan.py ==="));
}

#[tokio::test]
async fn test_generate_unknown_functionality() {
    let dir = tempfile::tempdir().unwrap();
    let document = dir.path().join("library.txt");
    fs::write(&document, DOCUMENT).unwrap();

    let (_provider, mut workspace, formatter) = setup();
    let err = execute_generate(
        GenerateArgs {
            document,
            name: "Payroll".to_string(),
            language: None,
            out: Some(dir.path().join("never")),
            content_type: None,
        },
        &mut workspace,
        &Config::default(),
        &formatter,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CliError::NotFound(_)));
    assert!(!dir.path().join("never").exists());
}

#[tokio::test]
async fn test_materialize_saved_response() {
    let dir = tempfile::tempdir().unwrap();
    let response = dir.path().join("response.txt");
    fs::write(&response, "=== FILE: routes/index.js ===\nmodule.exports = {};\n=== END FILE ===\n").unwrap();
    let out = dir.path().join("site");

    let (provider, workspace, formatter) = setup();
    execute_materialize(
        MaterializeArgs {
            response,
            out: Some(out.clone()),
        },
        &workspace,
        &Config::default(),
        &formatter,
    )
    .await
    .unwrap();

    assert_eq!(
        fs::read_to_string(out.join("routes").join("index.js")).unwrap(),
        "module.exports = {};"
    );
    assert_eq!(provider.completion_calls(), 0);
}

#[tokio::test]
async fn test_materialize_rejects_empty_response() {
    let dir = tempfile::tempdir().unwrap();
    let response = dir.path().join("empty.txt");
    fs::write(&response, "  \n").unwrap();

    let (_provider, workspace, formatter) = setup();
    let err = execute_materialize(
        MaterializeArgs { response, out: None },
        &workspace,
        &Config::default(),
        &formatter,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CliError::InvalidInput(_)));
}
