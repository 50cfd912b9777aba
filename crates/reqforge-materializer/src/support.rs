//! Support modules for generated code that imports the legacy
//! `config.database` module.
//!
//! Generated Python code is expected to use Flask-SQLAlchemy. When it
//! instead imports `config.database` the import would fail at runtime, so a
//! minimal module is synthesized next to it.

use crate::error::MaterializeError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio::fs;
use tracing::{info, warn};

/// Relative path of the synthesized database module
pub const DATABASE_MODULE_PATH: &str = "config/database.py";

/// Relative path of the synthesized package marker
pub const CONFIG_PACKAGE_PATH: &str = "config/__init__.py";

const DATABASE_MODULE: &str = "from sqlalchemy.ext.declarative import declarative_base\n\nBase = declarative_base()\n";

const INIT_DB_BLOCK: &str = r#"
from sqlalchemy import create_engine
from sqlalchemy.orm import sessionmaker

def init_db(database_uri='sqlite:///app.db'):
    """Initialize database connection"""
    engine = create_engine(database_uri)
    Base.metadata.create_all(engine)
    Session = sessionmaker(bind=engine)
    return Session()
"#;

const CONFIG_PACKAGE: &str = "# Empty file to make config a Python package\n";

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid support regex"))
}

fn preferred_convention() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"from flask_sqlalchemy import SQLAlchemy|db = SQLAlchemy|from app import db|db\.Model")
}

fn legacy_import() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"from config\.database import|from config import.*database|import.*config\.database")
}

fn init_db_import() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"from config\.database import.*init_db|import.*init_db.*config\.database")
}

/// What the generated code requires from the support modules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportNeeds {
    /// Nothing to synthesize
    None,
    /// `config.database` with a declarative `Base`
    Database {
        /// Whether `init_db` is imported as well
        init_db: bool,
    },
}

impl SupportNeeds {
    /// Scan generated code for legacy imports.
    ///
    /// Any use of the Flask-SQLAlchemy convention disables synthesis.
    pub fn scan(code: &str) -> Self {
        if preferred_convention().is_match(code) || !legacy_import().is_match(code) {
            return SupportNeeds::None;
        }
        SupportNeeds::Database { init_db: init_db_import().is_match(code) }
    }
}

async fn exists(path: &Path) -> Result<bool, MaterializeError> {
    fs::try_exists(path).await.map_err(|e| MaterializeError::io(path, e))
}

async fn write(path: &Path, content: &str) -> Result<(), MaterializeError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(|e| MaterializeError::io(parent, e))?;
    }
    fs::write(path, content).await.map_err(|e| MaterializeError::io(path, e))
}

/// Create or extend the support modules under `target_dir`.
///
/// Returns the relative paths created or modified.
pub async fn ensure_support_files(target_dir: &Path, needs: SupportNeeds) -> Result<Vec<PathBuf>, MaterializeError> {
    let SupportNeeds::Database { init_db } = needs else {
        return Ok(Vec::new());
    };

    let mut touched = Vec::new();
    let database = target_dir.join(DATABASE_MODULE_PATH);

    if !exists(&database).await? {
        let mut content = DATABASE_MODULE.to_string();
        if init_db {
            content.push_str(INIT_DB_BLOCK);
        }
        write(&database, &content).await?;
        warn!(
            "Created {} for legacy imports{}",
            DATABASE_MODULE_PATH,
            if init_db { " with init_db" } else { "" }
        );
        touched.push(PathBuf::from(DATABASE_MODULE_PATH));
    } else if init_db {
        let existing = fs::read_to_string(&database)
            .await
            .map_err(|e| MaterializeError::io(&database, e))?;
        if !existing.contains("def init_db") {
            write(&database, &format!("{}\n{}", existing, INIT_DB_BLOCK)).await?;
            warn!("Added init_db to existing {}", DATABASE_MODULE_PATH);
            touched.push(PathBuf::from(DATABASE_MODULE_PATH));
        }
    }

    let package = target_dir.join(CONFIG_PACKAGE_PATH);
    if !exists(&package).await? {
        write(&package, CONFIG_PACKAGE).await?;
        info!("Created {}", CONFIG_PACKAGE_PATH);
        touched.push(PathBuf::from(CONFIG_PACKAGE_PATH));
    }

    Ok(touched)
}
