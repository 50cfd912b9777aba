//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::workspace::Workspace;
use reqforge_domain::FunctionalityRecord;
use reqforge_llm::LlmProvider;
use std::fs;

/// Execute the extract command.
pub async fn execute_extract<P: LlmProvider>(
    args: ExtractArgs,
    workspace: &mut Workspace<P>,
    formatter: &Formatter,
) -> Result<()> {
    let session = workspace
        .ingest(&args.document, args.content_type.map(Into::into))
        .await?;

    let summaries = session.index().summaries();
    let records: Vec<FunctionalityRecord> = session
        .index()
        .all()
        .iter()
        .cloned()
        .map(|mut record| {
            record.embedding = None;
            record
        })
        .collect();

    if let Some(report) = workspace.last_report() {
        let report = formatter.format_report(report)?;
        if !report.is_empty() {
            eprintln!("{}", report);
        }
    }
    println!("{}", formatter.format_summaries(&summaries)?);

    if let Some(path) = args.save {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, formatter.format_records_json(&records)?)?;
        eprintln!(
            "{}",
            formatter.success(&format!("Saved {} records to {}", records.len(), path.display()))
        );
    }

    Ok(())
}
