//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use reqforge_extractor::ContentType;
use reqforge_materializer::TargetLanguage;
use std::path::PathBuf;

/// reqforge - Turn requirements documents into functionality records and code.
#[derive(Debug, Parser)]
#[command(name = "reqforge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API key for the completion service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Log pipeline details at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (names and paths only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract functionalities from a requirements document
    Extract(ExtractArgs),

    /// Generate a project for one functionality of a document
    Generate(GenerateArgs),

    /// Write a saved generation response to disk
    Materialize(MaterializeArgs),

    /// Generate a test file for one functionality of a generated project
    Tests(TestsArgs),

    /// Enter interactive REPL mode
    Repl,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Requirements document (.pdf, .docx, .txt, .md)
    pub document: PathBuf,

    /// Document type, inferred from the extension when omitted
    #[arg(short = 't', long = "type", value_enum)]
    pub content_type: Option<ContentTypeArg>,

    /// Write the extracted records as JSON to this file
    #[arg(short, long)]
    pub save: Option<PathBuf>,
}

/// Arguments for the generate command.
#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// Requirements document
    pub document: PathBuf,

    /// Functionality name (case-insensitive substring)
    pub name: String,

    /// Target language
    #[arg(short, long, value_enum)]
    pub language: Option<LanguageArg>,

    /// Output directory, defaults to <output_dir>/<project name>
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Document type, inferred from the extension when omitted
    #[arg(short = 't', long = "type", value_enum)]
    pub content_type: Option<ContentTypeArg>,
}

/// Arguments for the materialize command.
#[derive(Debug, Parser)]
pub struct MaterializeArgs {
    /// File holding a raw generation response
    pub response: PathBuf,

    /// Output directory, defaults to <output_dir>/<response file stem>
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Arguments for the tests command.
#[derive(Debug, Parser)]
pub struct TestsArgs {
    /// Requirements document
    pub document: PathBuf,

    /// Functionality name (case-insensitive substring)
    pub name: String,

    /// Target language
    #[arg(short, long, value_enum)]
    pub language: Option<LanguageArg>,

    /// Generated project to test, defaults to <output_dir>/<project name>
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Document type, inferred from the extension when omitted
    #[arg(short = 't', long = "type", value_enum)]
    pub content_type: Option<ContentTypeArg>,
}

/// Document type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ContentTypeArg {
    /// PDF document
    Pdf,
    /// Word document
    Docx,
    /// Plain text or markdown
    Text,
}

/// Target language argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LanguageArg {
    /// Python (Flask)
    Python,
    /// JavaScript (Express)
    Javascript,
    /// Java (Spring Boot)
    Java,
    /// C# (ASP.NET Core)
    Csharp,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<ContentTypeArg> for ContentType {
    fn from(arg: ContentTypeArg) -> Self {
        match arg {
            ContentTypeArg::Pdf => ContentType::Pdf,
            ContentTypeArg::Docx => ContentType::Docx,
            ContentTypeArg::Text => ContentType::PlainText,
        }
    }
}

impl From<LanguageArg> for TargetLanguage {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::Python => TargetLanguage::Python,
            LanguageArg::Javascript => TargetLanguage::JavaScript,
            LanguageArg::Java => TargetLanguage::Java,
            LanguageArg::Csharp => TargetLanguage::CSharp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_means_repl() {
        let cli = Cli::parse_from(["reqforge"]);
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_extract_command() {
        let cli = Cli::parse_from(["reqforge", "extract", "srs.pdf", "--type", "text", "--save", "out.json"]);
        match cli.command {
            Some(Command::Extract(args)) => {
                assert_eq!(args.document, PathBuf::from("srs.pdf"));
                assert_eq!(args.content_type, Some(ContentTypeArg::Text));
                assert_eq!(args.save, Some(PathBuf::from("out.json")));
            }
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_generate_command() {
        let cli = Cli::parse_from(["reqforge", "-v", "generate", "srs.docx", "User Login", "-l", "java"]);
        assert!(cli.verbose);
        match cli.command {
            Some(Command::Generate(args)) => {
                assert_eq!(args.name, "User Login");
                assert_eq!(args.language, Some(LanguageArg::Java));
                assert!(args.out.is_none());
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_tests_command() {
        let cli = Cli::parse_from(["reqforge", "tests", "srs.pdf", "Login", "--project", "generated/srs"]);
        match cli.command {
            Some(Command::Tests(args)) => {
                assert_eq!(args.name, "Login");
                assert_eq!(args.project, Some(PathBuf::from("generated/srs")));
                assert!(args.language.is_none());
            }
            _ => panic!("Expected Tests command"),
        }
    }

    #[test]
    fn test_conversions() {
        let language: TargetLanguage = LanguageArg::Csharp.into();
        assert_eq!(language, TargetLanguage::CSharp);
        let content_type: ContentType = ContentTypeArg::Text.into();
        assert_eq!(content_type, ContentType::PlainText);
    }
}
