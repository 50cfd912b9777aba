//! reqforge Materializer
//!
//! Generates code for a functionality record and reconstructs a directory
//! tree from the model's freeform response.
//!
//! # Architecture
//!
//! ```text
//! record → CodeGenerator → response → NarrationStripper → strategy cascade → files → disk
//!                                                          ├─ BoundaryMarkerStrategy
//!                                                          ├─ HeadingStrategy
//!                                                          ├─ LanguageLayoutStrategy
//!                                                          └─ single-file fallback
//! ```
//!
//! Parsing never fails: any non-blank response produces at least one file.
//! After writing, a support check synthesizes `config/database.py` for code
//! that still imports it.
//!
//! `TestGenerator` reads a written project back with `collect_sources` and
//! asks for one test file, which `Materializer::materialize_tests` writes
//! under `tests/` (`__tests__/` for JavaScript).
//!
//! # Example Usage
//!
//! ```no_run
//! use reqforge_materializer::Materializer;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let materializer = Materializer::default();
//! let result = materializer
//!     .materialize("#### app.py\nprint('hello')", Path::new("out"))
//!     .await?;
//!
//! println!("Wrote {} files using {}", result.written.len(), result.strategy);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod file;
mod generation;
mod language;
mod materializer;
mod narration;
pub mod strategy;
mod support;
mod test_generation;

pub use config::{DenyList, MaterializerConfig, DEFAULT_DENY_LIST, DEFAULT_FALLBACK_FILE_NAME};
pub use error::MaterializeError;
pub use file::{display_path, normalize_relative_path, GeneratedFile};
pub use generation::{build_generation_prompt, CodeGenerator, TargetLanguage, GENERATION_SYSTEM_PROMPT};
pub use language::{detect_language, Language};
pub use materializer::{Materialization, MaterializationPlan, Materializer, FALLBACK_STRATEGY, TEST_FILE_STRATEGY};
pub use narration::{looks_like_code, NarrationRule, NarrationStripper, RuleAction, EXPLANATORY_OPENERS, TEST_NARRATION_OPENERS};
pub use strategy::ParseStrategy;
pub use support::{ensure_support_files, SupportNeeds, CONFIG_PACKAGE_PATH, DATABASE_MODULE_PATH};
pub use test_generation::{
    build_test_prompt, collect_sources, render_sources, test_file_path, TestGenerator, MAX_TEST_PROMPT_CHARS,
    TEST_SYSTEM_PROMPT,
};
