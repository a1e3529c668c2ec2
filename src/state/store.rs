//! JSON-file persistence for [`CrawlState`]

use crate::state::CrawlState;
use crate::storage::{write_atomic, StorageError, StorageResult};
use std::path::{Path, PathBuf};

/// Reads and writes the state file
///
/// Loading never fails: a missing or unreadable file yields the default
/// state and the next run is a full crawl.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted state, or the default state
    pub fn load(&self) -> CrawlState {
        if !self.path.exists() {
            tracing::info!("No crawl state at {}, starting fresh", self.path.display());
            return CrawlState::default();
        }

        let parsed = std::fs::read_to_string(&self.path)
            .map_err(|e| StorageError::io(&self.path, e))
            .and_then(|data| {
                serde_json::from_str::<CrawlState>(&data)
                    .map_err(|e| StorageError::json(&self.path, e))
            });

        match parsed {
            Ok(state) => {
                tracing::info!(
                    "Loaded crawl state: last_crawl_time={}",
                    state
                        .last_crawl_time
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "None".to_string())
                );
                state
            }
            Err(e) => {
                tracing::warn!("Error loading crawl state: {}", e);
                CrawlState::default()
            }
        }
    }

    /// Writes the state, logging instead of failing
    pub fn save(&self, state: &CrawlState) {
        if let Err(e) = self.try_save(state) {
            tracing::error!("Error saving crawl state: {}", e);
        }
    }

    /// Writes the state through a temp file and rename
    pub fn try_save(&self, state: &CrawlState) -> StorageResult<()> {
        let data =
            serde_json::to_string_pretty(state).map_err(|e| StorageError::json(&self.path, e))?;
        write_atomic(&self.path, data.as_bytes())?;
        tracing::info!(
            "Saved crawl state: last_crawl_time={}",
            state
                .last_crawl_time
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "None".to_string())
        );
        Ok(())
    }
}
