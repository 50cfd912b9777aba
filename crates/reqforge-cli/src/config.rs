//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use reqforge_extractor::ExtractorConfig;
use reqforge_llm::OpenAiConfig;
use reqforge_materializer::{MaterializerConfig, TargetLanguage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the completion service key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Completion service connection
    #[serde(default)]
    pub llm: OpenAiConfig,

    /// Extraction settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Materialization settings
    #[serde(default)]
    pub materializer: MaterializerConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Command history size
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Language used when none is given
    #[serde(default = "default_language")]
    pub language: String,

    /// Parent directory for generated projects
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(app_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location, or defaults if absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from `path`, or defaults if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the default configuration file, writing defaults first when it
    /// does not exist yet.
    pub fn load_or_init() -> Result<Self> {
        Self::load_or_init_at(&Self::path()?)
    }

    /// Load `path`, writing defaults there first when it does not exist.
    ///
    /// An existing file that fails to parse or validate is an error and is
    /// never overwritten.
    pub fn load_or_init_at(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load_from(path);
        }
        let config = Self::default();
        config.save_to(path)?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.llm.validate().map_err(|e| CliError::Config(format!("[llm] {}", e)))?;
        self.extractor
            .validate()
            .map_err(|e| CliError::Config(format!("[extractor] {}", e)))?;
        self.materializer
            .validate()
            .map_err(|e| CliError::Config(format!("[materializer] {}", e)))?;
        self.default_language()?;
        Ok(())
    }

    /// Replace the stored key with `key` when one is given and not blank.
    pub fn apply_api_key(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.llm.api_key = Some(key);
        }
    }

    /// Language used when a command does not name one.
    pub fn default_language(&self) -> Result<TargetLanguage> {
        self.settings
            .language
            .parse()
            .map_err(|e: String| CliError::Config(format!("[settings] {}", e)))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            history_size: 1000,
            language: default_language(),
            output_dir: default_output_dir(),
        }
    }
}

/// `~/.reqforge`
pub fn app_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    Ok(home.join(".reqforge"))
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_history_size() -> usize {
    1000
}

fn default_language() -> String {
    TargetLanguage::default().to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}
