//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use reqforge_domain::{FunctionalityRecord, FunctionalitySummary};
use reqforge_extractor::ExtractionReport;
use reqforge_materializer::{display_path, Materialization};
use std::path::Path;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const DESCRIPTION_WIDTH: usize = 60;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the functionality listing of a document.
    pub fn format_summaries(&self, summaries: &[FunctionalitySummary]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(summaries)?),
            OutputFormat::Quiet => Ok(summaries
                .iter()
                .map(|s| s.title.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if summaries.is_empty() {
                    return Ok(self.colorize("No functionalities found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["#", "ID", "Name", "Description", "Use cases"]);
                for (i, summary) in summaries.iter().enumerate() {
                    builder.push_record([
                        (i + 1).to_string(),
                        summary.id.clone(),
                        summary.title.clone(),
                        truncate(&summary.description, DESCRIPTION_WIDTH),
                        summary.use_cases.len().to_string(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format full records, as saved by `extract --save`.
    pub fn format_records_json(&self, records: &[FunctionalityRecord]) -> Result<String> {
        Ok(serde_json::to_string_pretty(records)?)
    }

    /// Format one record in detail.
    pub fn format_record(&self, record: &FunctionalityRecord) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
            OutputFormat::Quiet => Ok(record.name.clone()),
            OutputFormat::Table => {
                let mut out = String::new();
                out.push_str(&self.colorize(&record.name, "cyan"));
                out.push('\n');
                if !record.description.is_empty() {
                    out.push_str(&format!("\n{}\n", record.description));
                }
                if !record.context.is_empty() {
                    out.push_str(&format!("\nContext: {}\n", record.context));
                }
                for (title, items) in [
                    ("Use cases", &record.use_cases),
                    ("Requirements", &record.requirements),
                    ("Workflows", &record.activity_diagrams),
                    ("Depends on", &record.dependencies),
                ] {
                    if items.is_empty() {
                        continue;
                    }
                    out.push_str(&format!("\n{}:\n", title));
                    for item in items {
                        out.push_str(&format!("  - {}\n", item));
                    }
                }
                Ok(out.trim_end().to_string())
            }
        }
    }

    /// Format extraction accounting.
    pub fn format_report(&self, report: &ExtractionReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Quiet => Ok(String::new()),
            OutputFormat::Table => {
                let mut lines = vec![self.info(&format!(
                    "{} functionalities via {} ({} chunks)",
                    report.records.len(),
                    report.strategy,
                    report.chunk_count
                ))];
                if !report.malformed_chunks.is_empty() {
                    let chunks: Vec<String> = report.malformed_chunks.iter().map(|i| (i + 1).to_string()).collect();
                    lines.push(self.warning(&format!("Unparseable responses for chunks {}", chunks.join(", "))));
                }
                if report.discarded_nameless > 0 {
                    lines.push(self.warning(&format!("{} nameless records discarded", report.discarded_nameless)));
                }
                if let Some(error) = &report.decode_error {
                    lines.push(self.warning(&format!("Document could not be decoded: {}", error)));
                }
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format the files written by a materialization.
    pub fn format_materialization(&self, result: &Materialization, target_dir: &Path) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "targetDir": target_dir.display().to_string(),
                "strategy": result.strategy,
                "written": result.written.iter().map(|p| display_path(p)).collect::<Vec<_>>(),
                "synthesized": result.synthesized.iter().map(|p| display_path(p)).collect::<Vec<_>>(),
            }))?),
            OutputFormat::Quiet => Ok(result
                .written
                .iter()
                .chain(result.synthesized.iter())
                .map(|p| target_dir.join(p).display().to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["File", "Source"]);
                for path in &result.written {
                    builder.push_record([display_path(path), "generated".to_string()]);
                }
                for path in &result.synthesized {
                    builder.push_record([display_path(path), "support".to_string()]);
                }
                let summary = self.success(&format!(
                    "Wrote {} files to {} ({})",
                    result.file_count(),
                    target_dir.display(),
                    result.strategy
                ));
                Ok(format!("{}\n{}", self.render(builder), summary))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Shorten `text` to at most `max` characters, marking the cut with `...`.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn summaries() -> Vec<FunctionalitySummary> {
        let mut record = FunctionalityRecord::new("Student Registration", "Register students for courses");
        record.use_cases = vec!["Sign up".to_string(), "Confirm email".to_string()];
        vec![FunctionalitySummary::from(&record)]
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_summaries(&summaries()).unwrap();
        assert!(output.contains("Use cases"));
        assert!(output.contains("student-registration"));
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_summaries(&summaries()).unwrap();
        assert!(output.contains("\"useCases\""));
        assert!(output.contains("\"title\": \"Student Registration\""));
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(formatter.format_summaries(&summaries()).unwrap(), "Student Registration");
    }

    #[test]
    fn test_empty_listing() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_summaries(&[]).unwrap();
        assert!(output.contains("No functionalities found"));
    }

    #[test]
    fn test_record_detail() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut record = FunctionalityRecord::new("Login", "Authenticate users");
        record.requirements = vec!["Lock after 5 failures".to_string()];

        let output = formatter.format_record(&record).unwrap();
        assert!(output.starts_with("Login"));
        assert!(output.contains("Requirements:\n  - Lock after 5 failures"));
        assert!(!output.contains("Use cases"));
    }

    #[test]
    fn test_materialization_quiet_lists_paths() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let result = Materialization {
            strategy: "headings",
            written: vec![PathBuf::from("app.py")],
            synthesized: vec![PathBuf::from("config").join("__init__.py")],
        };
        let output = formatter.format_materialization(&result, Path::new("out")).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("app.py"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }
}
