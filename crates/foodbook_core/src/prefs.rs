//! User preferences: where data lives and how the store is configured.
//!
//! # Responsibility
//! - Load/save the preferences JSON document.
//! - Build the configured storage backend and undo bound.
//!
//! # Invariants
//! - A missing preferences file yields `UserPrefs::default()`.
//! - A malformed preferences file is an error, never silently replaced.
//! - `undo_history_limit = 0` means unbounded history.

use crate::storage::{FoodBookStorage, JsonFoodBookStorage, SqliteFoodBookStorage, StorageError};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

const DEFAULT_DATA_FILE: &str = "data/foodbook.json";

/// Persistence backend selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
}

/// Preferences document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPrefs {
    /// Data file (JSON document or SQLite database).
    pub data_file_path: PathBuf,
    pub storage_backend: StorageBackend,
    /// Maximum undo depth; 0 keeps every checkpoint.
    pub undo_history_limit: usize,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute log directory; file logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for UserPrefs {
    fn default() -> Self {
        Self {
            data_file_path: PathBuf::from(DEFAULT_DATA_FILE),
            storage_backend: StorageBackend::Json,
            undo_history_limit: 0,
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl UserPrefs {
    /// Undo bound in the form `ModelManager` expects.
    pub fn history_limit(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.undo_history_limit)
    }

    /// Builds the configured storage backend.
    pub fn open_storage(&self) -> Result<Box<dyn FoodBookStorage>, StorageError> {
        match self.storage_backend {
            StorageBackend::Json => Ok(Box::new(JsonFoodBookStorage::new(
                self.data_file_path.clone(),
            ))),
            StorageBackend::Sqlite => {
                if let Some(parent) = self
                    .data_file_path
                    .parent()
                    .filter(|parent| !parent.as_os_str().is_empty())
                {
                    std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
                Ok(Box::new(SqliteFoodBookStorage::open(&self.data_file_path)?))
            }
        }
    }
}

/// Preferences load/save errors.
#[derive(Debug)]
pub enum PrefsError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for PrefsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot access preferences `{}`: {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "malformed preferences `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for PrefsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

/// Reads preferences from `path`, falling back to defaults when absent.
pub fn read_user_prefs(path: impl AsRef<Path>) -> Result<UserPrefs, PrefsError> {
    let path = path.as_ref();
    if !path.exists() {
        info!(
            "event=prefs_read module=prefs status=missing path={}",
            path.display()
        );
        return Ok(UserPrefs::default());
    }

    let raw = std::fs::read_to_string(path).map_err(|source| PrefsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match serde_json::from_str(&raw) {
        Ok(prefs) => {
            info!("event=prefs_read module=prefs status=ok path={}", path.display());
            Ok(prefs)
        }
        Err(source) => {
            warn!(
                "event=prefs_read module=prefs status=error path={} error={}",
                path.display(),
                source
            );
            Err(PrefsError::Json {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// Writes preferences as pretty JSON, creating parent directories.
pub fn save_user_prefs(path: impl AsRef<Path>, prefs: &UserPrefs) -> Result<(), PrefsError> {
    let path = path.as_ref();
    let io_error = |source| PrefsError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    let body = serde_json::to_string_pretty(prefs).map_err(|source| PrefsError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, body).map_err(io_error)
}
