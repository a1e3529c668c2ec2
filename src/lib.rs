//! Tidewatch: an incremental news listing tracker
//!
//! This crate walks a paginated news listing, extracts article records, and
//! keeps a deduplicated, date-sorted record set up to date across repeated
//! runs. Each run only looks at articles newer than the previous run (minus a
//! safety buffer) unless a full crawl is requested.

pub mod article;
pub mod config;
pub mod crawler;
pub mod output;
pub mod runner;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Tidewatch operations
#[derive(Debug, Error)]
pub enum TideError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in layout: {0}")]
    InvalidSelector(String),

    #[error("Invalid value for environment variable {name}: '{value}' ({reason})")]
    InvalidEnv {
        name: String,
        value: String,
        reason: String,
    },
}

/// Result type alias for Tidewatch operations
pub type Result<T> = std::result::Result<T, TideError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use article::{merge_articles, Article};
pub use config::Config;
pub use output::CrawlOutcome;
pub use runner::{run_tracker, Tracker};
pub use state::{CrawlState, StateStore};
