//! Process-level catalog configuration.
//!
//! # Responsibility
//! - Hold database location and logging settings for one process.
//! - Prepare the data directory before the database is opened.
//!
//! # Invariants
//! - `log_dir`, when set, is absolute.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_DB_PATH: &str = "data/library.sqlite";

#[derive(Debug)]
pub enum ConfigError {
    RelativeLogDir(PathBuf),
    DataDir { path: PathBuf, source: std::io::Error },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelativeLogDir(path) => write!(
                f,
                "log directory must be an absolute path, got `{}`",
                path.display()
            ),
            Self::DataDir { path, source } => write!(
                f,
                "failed to create data directory `{}`: {source}",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RelativeLogDir(_) => None,
            Self::DataDir { source, .. } => Some(source),
        }
    }
}

/// Where the catalog lives and how it logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// `None` leaves file logging off.
    pub log_dir: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CatalogConfig {
    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Sets the log directory; relative paths are rejected.
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let dir = dir.into();
        if !dir.is_absolute() {
            return Err(ConfigError::RelativeLogDir(dir));
        }
        self.log_dir = Some(dir);
        Ok(self)
    }

    /// Creates the directory holding `db_path` when it is missing.
    pub fn ensure_data_dir(&self) -> Result<(), ConfigError> {
        let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::DataDir {
            path: parent.to_path_buf(),
            source,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}
