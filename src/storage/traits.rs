//! Storage traits and error types
//!
//! This module defines the trait interface for the persisted record set and
//! the errors file-backed storage can raise.

use crate::article::Article;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl StorageError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for the persisted record set
///
/// The run treats a missing primary record file as a first run, so
/// implementations must report existence separately from loading.
pub trait ArticleStore {
    /// Returns true if the primary record file exists
    fn exists(&self) -> bool;

    /// Loads the persisted records
    ///
    /// Returns an empty set when nothing has been persisted yet.
    fn load_articles(&self) -> StorageResult<Vec<Article>>;

    /// Replaces the persisted records with `articles`
    fn save_articles(&self, articles: &[Article]) -> StorageResult<()>;

    /// Where records are written
    fn location(&self) -> &Path;
}
