//! Turns a freeform generation response into files on disk

use crate::config::MaterializerConfig;
use crate::error::MaterializeError;
use crate::file::{display_path, GeneratedFile};
use crate::narration::{is_file_marker, NarrationStripper};
use crate::strategy::{default_cascade, ParseStrategy};
use crate::support::{ensure_support_files, SupportNeeds};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Name reported when no strategy recognized any file
pub const FALLBACK_STRATEGY: &str = "single-file-fallback";

/// Name reported for a generated test file
pub const TEST_FILE_STRATEGY: &str = "test-file";

/// Files recognized in a response, before anything is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializationPlan {
    /// Strategy that produced the files
    pub strategy: &'static str,

    /// Files in document order
    pub files: Vec<GeneratedFile>,
}

/// Outcome of a materialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialization {
    /// Strategy that produced the files
    pub strategy: &'static str,

    /// Relative paths written from the response, first-write order, no
    /// duplicates
    pub written: Vec<PathBuf>,

    /// Relative paths created or extended by the support check
    pub synthesized: Vec<PathBuf>,
}

impl Materialization {
    /// Total number of distinct files touched
    pub fn file_count(&self) -> usize {
        self.written.len() + self.synthesized.iter().filter(|p| !self.written.contains(p)).count()
    }
}

/// Code Materializer
pub struct Materializer {
    config: MaterializerConfig,
    stripper: NarrationStripper,
    test_stripper: NarrationStripper,
    strategies: Vec<Box<dyn ParseStrategy>>,
}

impl Materializer {
    /// Create a materializer with the standard narration rules and strategy
    /// cascade
    pub fn new(config: MaterializerConfig) -> Self {
        let deny = config.deny_list();
        Self {
            stripper: NarrationStripper::new(deny.clone()),
            test_stripper: NarrationStripper::for_tests(),
            strategies: default_cascade(&deny),
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &MaterializerConfig {
        &self.config
    }

    /// Strip narration and run the strategy cascade without touching disk.
    ///
    /// Non-blank input always yields at least one file. Blank input, the
    /// empty string included, yields none: a file is never blank.
    pub fn plan(&self, response: &str) -> MaterializationPlan {
        // The only input that escapes the one-file guarantee
        if response.trim().is_empty() {
            return MaterializationPlan {
                strategy: FALLBACK_STRATEGY,
                files: Vec::new(),
            };
        }

        let cleaned = self.stripper.strip(response);
        debug!("Cleaned response: {} -> {} bytes", response.len(), cleaned.len());

        for strategy in &self.strategies {
            let files = strategy.try_parse(&cleaned);
            if !files.is_empty() {
                info!("Strategy '{}' recognized {} files", strategy.name(), files.len());
                return MaterializationPlan {
                    strategy: strategy.name(),
                    files,
                };
            }
            debug!("Strategy '{}' recognized nothing", strategy.name());
        }

        let body = if cleaned.is_empty() { response } else { cleaned.as_str() };
        let files = GeneratedFile::new(&self.config.fallback_file_name, body)
            .into_iter()
            .collect::<Vec<_>>();
        info!("No file structure recognized, writing {}", self.config.fallback_file_name);

        MaterializationPlan {
            strategy: FALLBACK_STRATEGY,
            files,
        }
    }

    /// Plan a single test file at `relative_path` from a test response.
    ///
    /// Fences, HTML comments, prose lines and file marker lines are removed.
    /// If cleaning leaves nothing, the raw response is kept; blank input
    /// yields no file.
    pub fn plan_tests(&self, response: &str, relative_path: &Path) -> MaterializationPlan {
        let mut plan = MaterializationPlan {
            strategy: TEST_FILE_STRATEGY,
            files: Vec::new(),
        };
        if response.trim().is_empty() {
            return plan;
        }

        let cleaned = self
            .test_stripper
            .strip(response)
            .split('\n')
            .filter(|line| !is_file_marker(line))
            .collect::<Vec<_>>()
            .join("\n");
        let body = if cleaned.trim().is_empty() { response } else { cleaned.as_str() };
        plan.files.extend(GeneratedFile::new(&display_path(relative_path), body));
        plan
    }

    /// Materialize `response` under `target_dir`.
    ///
    /// Existing files at the same paths are overwritten. Only filesystem
    /// failures are reported as errors.
    pub async fn materialize(&self, response: &str, target_dir: &Path) -> Result<Materialization, MaterializeError> {
        let plan = self.plan(response);
        let written = write_files(&plan.files, target_dir).await?;

        let synthesized = if self.config.synthesize_support_files && !plan.files.is_empty() {
            let code = plan
                .files
                .iter()
                .map(|f| f.content.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            ensure_support_files(target_dir, SupportNeeds::scan(&code)).await?
        } else {
            Vec::new()
        };

        info!(
            "Materialized {} files into {} using '{}'",
            written.len(),
            target_dir.display(),
            plan.strategy
        );

        Ok(Materialization {
            strategy: plan.strategy,
            written,
            synthesized,
        })
    }

    /// Write a generated test file to `relative_path` under `target_dir`.
    ///
    /// An existing test file is overwritten. No support files are
    /// synthesized.
    pub async fn materialize_tests(
        &self,
        response: &str,
        relative_path: &Path,
        target_dir: &Path,
    ) -> Result<Materialization, MaterializeError> {
        let plan = self.plan_tests(response, relative_path);
        let written = write_files(&plan.files, target_dir).await?;
        info!("Wrote {} test files into {}", written.len(), target_dir.display());

        Ok(Materialization {
            strategy: plan.strategy,
            written,
            synthesized: Vec::new(),
        })
    }
}

/// Write `files` under `target_dir`, returning distinct relative paths in
/// first-write order
async fn write_files(files: &[GeneratedFile], target_dir: &Path) -> Result<Vec<PathBuf>, MaterializeError> {
    let mut written: Vec<PathBuf> = Vec::new();

    for file in files {
        let destination = target_dir.join(&file.path);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| MaterializeError::io(parent, e))?;
        }
        fs::write(&destination, &file.content)
            .await
            .map_err(|e| MaterializeError::io(&destination, e))?;
        debug!("Wrote {} ({} bytes)", file.display_path(), file.content.len());

        if !written.contains(&file.path) {
            written.push(file.path.clone());
        }
    }

    Ok(written)
}

impl Default for Materializer {
    fn default() -> Self {
        Self::new(MaterializerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_response_plans_nothing() {
        let plan = Materializer::default().plan(" \n\t\n");
        assert!(plan.files.is_empty());
    }

    #[test]
    fn test_only_blank_input_yields_no_file() {
        let materializer = Materializer::default();
        for blank in ["", " ", "\r\n", " \t\n\r\n "] {
            assert!(materializer.plan(blank).files.is_empty(), "{:?}", blank);
        }
        for minimal in [".", "x", "```", "\n#\n"] {
            assert_eq!(materializer.plan(minimal).files.len(), 1, "{:?}", minimal);
        }
    }

    #[test]
    fn test_test_plan_is_one_file_at_the_given_path() {
        let response = "Here is the test:\n#### tests/login_test.py\n```python\nfrom app import app\n\ndef test_login():\n    assert app\n```\nNote: run pytest.";
        let plan = Materializer::default().plan_tests(response, Path::new("tests/login_test.py"));

        assert_eq!(plan.strategy, TEST_FILE_STRATEGY);
        assert_eq!(plan.files.len(), 1);
        assert_eq!(plan.files[0].path, PathBuf::from("tests").join("login_test.py"));
        assert_eq!(plan.files[0].content, "from app import app\n\ndef test_login():\n    assert app");
    }

    #[test]
    fn test_test_plan_keeps_raw_response_when_cleaning_empties_it() {
        let materializer = Materializer::default();
        let plan = materializer.plan_tests("Note: nothing to test.", Path::new("tests/x_test.py"));
        assert_eq!(plan.files[0].content, "Note: nothing to test.");
        assert!(materializer.plan_tests("  \n", Path::new("tests/x_test.py")).files.is_empty());
    }

    #[test]
    fn test_pure_narration_falls_back_to_single_file() {
        let plan = Materializer::default().plan("Sure! I can help with that project.");
        assert_eq!(plan.strategy, FALLBACK_STRATEGY);
        assert_eq!(plan.files.len(), 1);
        assert_eq!(plan.files[0].path, PathBuf::from("generated_code.txt"));
        assert_eq!(plan.files[0].content, "Sure! I can help with that project.");
    }

    #[test]
    fn test_fallback_uses_raw_response_when_cleaning_empties_it() {
        let plan = Materializer::default().plan("```\n```");
        assert_eq!(plan.strategy, FALLBACK_STRATEGY);
        assert_eq!(plan.files[0].content, "```\n```");
    }

    #[test]
    fn test_boundary_markers_win_over_headings() {
        let response = "=== FILE: app.py ===\n#### models/user.py\nX\n=== END FILE ===";
        let plan = Materializer::default().plan(response);
        assert_eq!(plan.strategy, "boundary-markers");
        assert_eq!(plan.files.len(), 1);
        assert_eq!(plan.files[0].content, "#### models/user.py\nX");
    }

    #[test]
    fn test_file_count_merges_overlap() {
        let result = Materialization {
            strategy: "headings",
            written: vec![PathBuf::from("app.py"), PathBuf::from("config/database.py")],
            synthesized: vec![PathBuf::from("config/database.py"), PathBuf::from("config/__init__.py")],
        };
        assert_eq!(result.file_count(), 3);
    }
}
