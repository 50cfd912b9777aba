//! Materialize command implementation.

use crate::cli::MaterializeArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::workspace::Workspace;
use reqforge_llm::LlmProvider;
use std::path::PathBuf;

/// Execute the materialize command on a saved response file.
pub async fn execute_materialize<P: LlmProvider>(
    args: MaterializeArgs,
    workspace: &Workspace<P>,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let response = tokio::fs::read_to_string(&args.response).await?;
    if response.trim().is_empty() {
        return Err(CliError::InvalidInput(format!(
            "{} is empty",
            args.response.display()
        )));
    }

    let target_dir = args.out.unwrap_or_else(|| default_target(&args.response, config));
    let result = workspace.materialize(&response, &target_dir).await?;

    println!("{}", formatter.format_materialization(&result, &target_dir)?);
    Ok(())
}

fn default_target(response: &std::path::Path, config: &Config) -> PathBuf {
    let stem = response
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| reqforge_index::DEFAULT_PROJECT_NAME.to_string());
    config.settings.output_dir.join(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_target_uses_file_stem() {
        let config = Config::default();
        assert_eq!(
            default_target(std::path::Path::new("responses/login.txt"), &config),
            PathBuf::from("generated").join("login")
        );
    }
}
