//! Interactive REPL (Read-Eval-Print Loop) mode.

use crate::cli::MaterializeArgs;
use crate::commands;
use crate::config::{app_dir, Config};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::workspace::Workspace;
use reqforge_extractor::ContentType;
use reqforge_llm::LlmProvider;
use reqforge_materializer::TargetLanguage;
use rustyline::error::ReadlineError;
use rustyline::{Config as EditorConfig, DefaultEditor};
use std::path::PathBuf;

/// Run the interactive REPL.
pub async fn run_repl<P: LlmProvider>(
    workspace: &mut Workspace<P>,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    println!("{}", formatter.info("reqforge REPL - Type 'help' for commands, 'exit' to quit"));
    println!();

    let editor_config = EditorConfig::builder()
        .max_history_size(config.settings.history_size)
        .map_err(|e| CliError::Config(format!("Invalid history size: {}", e)))?
        .build();
    let mut editor = DefaultEditor::with_config(editor_config)
        .map_err(|e| CliError::Io(std::io::Error::other(format!("Failed to initialize editor: {}", e))))?;

    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    loop {
        let prompt = match workspace.session() {
            Some(session) => format!("reqforge ({})> ", session.project_name()),
            None => "reqforge> ".to_string(),
        };

        match editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_repl_command(line) {
                    Ok(ReplCommand::Exit) => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    Ok(ReplCommand::Help) => {
                        print_help(formatter);
                    }
                    Ok(cmd) => {
                        if let Err(e) = execute_repl_command(cmd, workspace, config, formatter).await {
                            eprintln!("{}", formatter.error(&e.to_string()));
                        }
                    }
                    Err(e) => {
                        eprintln!("{}", formatter.error(&e.to_string()));
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    editor.save_history(&history_path).ok();

    Ok(())
}

/// REPL command type.
#[derive(Debug, PartialEq)]
enum ReplCommand {
    Exit,
    Help,
    Ingest {
        path: PathBuf,
        content_type: Option<ContentType>,
    },
    List,
    Show(String),
    Generate {
        name: String,
        language: Option<TargetLanguage>,
    },
    Materialize {
        response: PathBuf,
        out: Option<PathBuf>,
    },
    Tests {
        name: String,
        language: Option<TargetLanguage>,
    },
}

/// Parse a REPL command line.
fn parse_repl_command(line: &str) -> Result<ReplCommand> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    if parts.is_empty() {
        return Err(CliError::InvalidInput("Empty command".to_string()));
    }

    match parts[0] {
        "exit" | "quit" | "q" => Ok(ReplCommand::Exit),
        "help" | "?" => Ok(ReplCommand::Help),
        "ingest" | "load" => parse_ingest_command(&parts[1..]),
        "list" | "ls" => Ok(ReplCommand::List),
        "show" => {
            if parts.len() < 2 {
                return Err(CliError::InvalidInput("Usage: show <name>".to_string()));
            }
            Ok(ReplCommand::Show(parts[1..].join(" ")))
        }
        "generate" | "gen" => parse_generate_command(&parts[1..]),
        "materialize" => parse_materialize_command(&parts[1..]),
        "tests" | "test" => match parse_generate_command(&parts[1..]) {
            Ok(ReplCommand::Generate { name, language }) => Ok(ReplCommand::Tests { name, language }),
            _ => Err(CliError::InvalidInput(
                "Usage: tests [-l python|javascript|java|csharp] <name>".to_string(),
            )),
        },
        _ => Err(CliError::InvalidInput(format!(
            "Unknown command: {}. Type 'help' for available commands.",
            parts[0]
        ))),
    }
}

fn parse_ingest_command(args: &[&str]) -> Result<ReplCommand> {
    let Some(path) = args.first() else {
        return Err(CliError::InvalidInput("Usage: ingest <file> [pdf|docx|text]".to_string()));
    };

    let content_type = match args.get(1) {
        None => None,
        Some(&"pdf") => Some(ContentType::Pdf),
        Some(&"docx") => Some(ContentType::Docx),
        Some(&"text") | Some(&"txt") => Some(ContentType::PlainText),
        Some(other) => {
            return Err(CliError::InvalidInput(format!("Unknown document type: {}", other)));
        }
    };

    Ok(ReplCommand::Ingest {
        path: PathBuf::from(path),
        content_type,
    })
}

fn parse_generate_command(args: &[&str]) -> Result<ReplCommand> {
    let (language, name_parts) = match args {
        ["-l" | "--language", language, rest @ ..] => (Some(language.parse().map_err(CliError::InvalidInput)?), rest),
        rest => (None, rest),
    };

    if name_parts.is_empty() {
        return Err(CliError::InvalidInput(
            "Usage: generate [-l python|javascript|java|csharp] <name>".to_string(),
        ));
    }

    Ok(ReplCommand::Generate {
        name: name_parts.join(" "),
        language,
    })
}

fn parse_materialize_command(args: &[&str]) -> Result<ReplCommand> {
    match args {
        [response] => Ok(ReplCommand::Materialize {
            response: PathBuf::from(response),
            out: None,
        }),
        [response, out] => Ok(ReplCommand::Materialize {
            response: PathBuf::from(response),
            out: Some(PathBuf::from(out)),
        }),
        _ => Err(CliError::InvalidInput("Usage: materialize <response-file> [out-dir]".to_string())),
    }
}

/// Execute a REPL command.
async fn execute_repl_command<P: LlmProvider>(
    cmd: ReplCommand,
    workspace: &mut Workspace<P>,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    match cmd {
        ReplCommand::Ingest { path, content_type } => {
            let session = workspace.ingest(&path, content_type).await?;
            let message = format!(
                "Loaded {} functionalities from {}",
                session.index().len(),
                session.source_name()
            );
            println!("{}", formatter.success(&message));
            if let Some(report) = workspace.last_report() {
                let report = formatter.format_report(report)?;
                if !report.is_empty() {
                    println!("{}", report);
                }
            }
        }
        ReplCommand::List => {
            let session = workspace.require_session()?;
            println!("{}", formatter.format_summaries(&session.index().summaries())?);
        }
        ReplCommand::Show(name) => {
            println!("{}", formatter.format_record(workspace.find(&name)?)?);
        }
        ReplCommand::Generate { name, language } => {
            let language = match language {
                Some(language) => language,
                None => config.default_language()?,
            };
            let record_name = workspace.find(&name)?.name.clone();
            println!(
                "{}",
                formatter.info(&format!("Generating {} code for '{}'", language, record_name))
            );

            let response = workspace.generate(&name, language).await?;
            let target_dir = workspace.project_dir(&config.settings.output_dir);
            let result = workspace.materialize(&response, &target_dir).await?;
            println!("{}", formatter.format_materialization(&result, &target_dir)?);
        }
        ReplCommand::Materialize { response, out } => {
            commands::execute_materialize(MaterializeArgs { response, out }, workspace, config, formatter).await?;
        }
        ReplCommand::Tests { name, language } => {
            let language = match language {
                Some(language) => language,
                None => config.default_language()?,
            };
            let record_name = workspace.find(&name)?.name.clone();
            println!(
                "{}",
                formatter.info(&format!(
                    "Generating {} tests for '{}'",
                    language.test_framework(),
                    record_name
                ))
            );

            let project_dir = workspace.project_dir(&config.settings.output_dir);
            let result = workspace.generate_tests(&name, language, &project_dir).await?;
            if result.written.is_empty() {
                println!("{}", formatter.warning("The model returned no test code"));
            } else {
                println!("{}", formatter.format_materialization(&result, &project_dir)?);
            }
        }
        ReplCommand::Exit | ReplCommand::Help => {}
    }

    Ok(())
}

fn get_history_path() -> Result<PathBuf> {
    let dir = app_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("history.txt"))
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Available commands:"));
    println!();
    println!("  ingest <file> [pdf|docx|text]      - Extract and index a requirements document");
    println!("  list                               - List functionalities of the loaded document");
    println!("  show <name>                        - Show one functionality in detail");
    println!("  generate [-l <language>] <name>    - Generate and write a project for a functionality");
    println!("    language: python|javascript|java|csharp (default from config)");
    println!("  materialize <file> [out]           - Write a saved generation response to disk");
    println!("  tests [-l <language>] <name>       - Generate a test file for a generated project");
    println!("  help, ?                            - Show this help");
    println!("  exit, quit, q                      - Exit REPL");
    println!();
}
