//! Generate command implementation.

use crate::cli::GenerateArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use crate::workspace::Workspace;
use reqforge_llm::LlmProvider;

/// Execute the generate command: ingest, generate one record, materialize.
pub async fn execute_generate<P: LlmProvider>(
    args: GenerateArgs,
    workspace: &mut Workspace<P>,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let language = match args.language {
        Some(language) => language.into(),
        None => config.default_language()?,
    };

    workspace
        .ingest(&args.document, args.content_type.map(Into::into))
        .await?;

    let record = workspace.find(&args.name)?;
    eprintln!(
        "{}",
        formatter.info(&format!("Generating {} code for '{}'", language, record.name))
    );

    let response = workspace.generate(&args.name, language).await?;
    let target_dir = args
        .out
        .unwrap_or_else(|| workspace.project_dir(&config.settings.output_dir));
    let result = workspace.materialize(&response, &target_dir).await?;

    println!("{}", formatter.format_materialization(&result, &target_dir)?);
    Ok(())
}
