//! reqforge CLI - Requirements documents in, generated projects out.

use clap::Parser;
use reqforge_cli::commands;
use reqforge_cli::repl;
use reqforge_cli::{Cli, Command, Config, Formatter, Workspace};
use reqforge_llm::OpenAiProvider;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> reqforge_cli::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays pipeable
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_init()?,
    };
    config.apply_api_key(cli.api_key.clone());

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let provider = Arc::new(OpenAiProvider::new(config.llm.clone())?);
    let mut workspace = Workspace::new(provider, config.extractor.clone(), config.materializer.clone());

    match cli.command {
        None | Some(Command::Repl) => {
            repl::run_repl(&mut workspace, &config, &formatter).await?;
        }
        Some(Command::Extract(args)) => {
            commands::execute_extract(args, &mut workspace, &formatter).await?;
        }
        Some(Command::Generate(args)) => {
            commands::execute_generate(args, &mut workspace, &config, &formatter).await?;
        }
        Some(Command::Materialize(args)) => {
            commands::execute_materialize(args, &workspace, &config, &formatter).await?;
        }
        Some(Command::Tests(args)) => {
            commands::execute_tests(args, &mut workspace, &config, &formatter).await?;
        }
    }

    Ok(())
}
