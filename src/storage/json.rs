//! JSON record store
//!
//! Records are kept as a pretty-printed JSON array. Reads fall back through
//! a list of alternative files when the primary one is absent; writes always
//! go to the primary path.

use crate::article::Article;
use crate::config::OutputConfig;
use crate::storage::traits::{ArticleStore, StorageError, StorageResult};
use crate::storage::write_atomic;
use std::path::{Path, PathBuf};

/// File-backed [`ArticleStore`]
#[derive(Debug, Clone)]
pub struct JsonArticleStore {
    path: PathBuf,
    fallback_paths: Vec<PathBuf>,
}

impl JsonArticleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fallback_paths: Vec::new(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            path: PathBuf::from(&config.json_path),
            fallback_paths: config.fallback_json_paths.iter().map(PathBuf::from).collect(),
        }
    }

    pub fn with_fallbacks(mut self, paths: Vec<PathBuf>) -> Self {
        self.fallback_paths = paths;
        self
    }

    /// First existing file among the primary path and the fallbacks
    fn readable_path(&self) -> Option<&Path> {
        std::iter::once(&self.path)
            .chain(self.fallback_paths.iter())
            .map(PathBuf::as_path)
            .find(|path| path.exists())
    }
}

impl ArticleStore for JsonArticleStore {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load_articles(&self) -> StorageResult<Vec<Article>> {
        let Some(path) = self.readable_path() else {
            tracing::info!("No existing articles file found");
            return Ok(Vec::new());
        };

        let data = std::fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
        let articles: Vec<Article> =
            serde_json::from_str(&data).map_err(|e| StorageError::json(path, e))?;

        tracing::info!(
            "Loaded {} existing articles from {}",
            articles.len(),
            path.display()
        );
        Ok(articles)
    }

    fn save_articles(&self, articles: &[Article]) -> StorageResult<()> {
        let data =
            serde_json::to_string_pretty(articles).map_err(|e| StorageError::json(&self.path, e))?;
        write_atomic(&self.path, data.as_bytes())?;
        tracing::info!(
            "Saved {} articles to {}",
            articles.len(),
            self.path.display()
        );
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
