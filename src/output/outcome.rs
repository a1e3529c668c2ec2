//! Run outcome types
//!
//! A run always ends in a [`CrawlOutcome`]. It serializes with a `status`
//! tag so callers can dispatch on one field.

use crate::article::Article;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of one tracker run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CrawlOutcome {
    Success(CrawlSummary),
    Failure(CrawlFailure),
}

impl CrawlOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Process exit code: 0 on success, 1 on failure
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Success(_) => 0,
            Self::Failure(_) => 1,
        }
    }

    pub fn summary(&self) -> Option<&CrawlSummary> {
        match self {
            Self::Success(summary) => Some(summary),
            Self::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&CrawlFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }
}

/// A run that produced a record set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlSummary {
    /// The final record set, newest first
    pub articles: Vec<Article>,

    /// Records this run added
    pub new_articles_count: usize,

    /// Size of the final record set
    pub total_articles_count: usize,

    /// True when the run crawled without a cutoff
    pub is_first_run: bool,

    pub pages_visited: u32,

    /// Records this run added, newest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_articles: Vec<Article>,

    /// Set when the run was cut short or served persisted data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,

    /// Set when the pre-flight connectivity check failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_error: Option<String>,
}

/// A run that produced nothing usable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlFailure {
    pub kind: FailureKind,
    pub message: String,
    pub details: String,
}

impl CrawlFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: details.into(),
        }
    }
}

/// Why a run failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A full crawl ended with an empty record set
    NoArticlesFound,

    /// The site was unreachable and nothing was persisted to fall back on
    NetworkUnavailable,

    /// The record set could not be read or written
    Storage,

    /// The configuration could not be used at run time
    InvalidConfig,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoArticlesFound => "no articles found",
            Self::NetworkUnavailable => "network unavailable",
            Self::Storage => "storage error",
            Self::InvalidConfig => "invalid configuration",
        };
        f.write_str(name)
    }
}
