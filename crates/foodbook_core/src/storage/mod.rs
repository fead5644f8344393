//! Persistence collaborators for whole-book snapshots.
//!
//! # Responsibility
//! - Define the load/save contract used around `ModelManager`.
//! - Provide JSON-file and SQLite implementations of that contract.
//!
//! # Invariants
//! - Storage reads and writes full snapshots only; there is no partial save.
//! - A snapshot read back after a save equals the saved snapshot (order,
//!   identity and attributes).
//! - Loaded deliveries reference clients by name, and every name must resolve
//!   against the loaded client list or the read fails.

use crate::model::error::ModelError;
use crate::model::food_book::FoodBookSnapshot;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod json_storage;
pub mod sqlite;

pub use json_storage::JsonFoodBookStorage;
pub use sqlite::{DbError, SqliteFoodBookStorage};

pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised while reading or writing persisted data.
#[derive(Debug)]
pub enum StorageError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    Db(DbError),
    /// Persisted values that fail field validation or cannot be decoded.
    InvalidData(String),
    /// Persisted content that breaks store invariants (duplicates, dangling
    /// client references).
    Model(ModelError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error at `{}`: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "malformed data file `{}`: {source}", path.display())
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Model(err) => write!(f, "persisted data violates store rules: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::Model(err) => Some(err),
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ModelError> for StorageError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

/// Load/save contract for a full book.
pub trait FoodBookStorage {
    /// Human-readable location (file path or `:memory:`), for diagnostics.
    fn location(&self) -> String;

    /// Reads the persisted book; `Ok(None)` when nothing was saved yet.
    fn read_food_book(&self) -> StorageResult<Option<FoodBookSnapshot>>;

    /// Replaces persisted content with `snapshot`.
    fn save_food_book(&self, snapshot: &FoodBookSnapshot) -> StorageResult<()>;
}
