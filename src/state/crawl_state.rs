//! Persisted progress between runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What one run leaves behind for the next
///
/// `last_crawl_time` anchors the next run's cutoff, so it only moves forward
/// when a crawl ran to a normal stop. Partial, degraded and failed runs record
/// `last_error` and keep the old timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlState {
    /// When the last run that produced a record set finished
    pub last_crawl_time: Option<DateTime<Utc>>,

    /// Size of the last final record set
    pub total_articles_crawled: u64,

    /// True until the first run completes
    pub first_run: bool,

    /// Message of the last failed or degraded run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl Default for CrawlState {
    fn default() -> Self {
        Self {
            last_crawl_time: None,
            total_articles_crawled: 0,
            first_run: true,
            last_error: None,
        }
    }
}

impl CrawlState {
    /// Marks a run that produced a final set of `total` records at `finished_at`
    pub fn record_success(&mut self, finished_at: DateTime<Utc>, total: usize) {
        self.last_crawl_time = Some(finished_at);
        self.total_articles_crawled = total as u64;
        self.first_run = false;
        self.last_error = None;
    }

    /// Marks a run whose crawl ended on a fetch failure
    ///
    /// The `total` records were persisted, but pages past the failure were
    /// never seen, so the timestamp stays put and the next run re-covers the
    /// same window.
    pub fn record_partial(&mut self, total: usize, message: impl Into<String>) {
        self.total_articles_crawled = total as u64;
        self.first_run = false;
        self.last_error = Some(message.into());
    }

    /// Marks a run that could not produce a record set
    ///
    /// The timestamp is left alone so the next run re-covers the same window.
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }
}
