//! Configuration module for Tidewatch
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and the strict environment overrides used by scheduled runs.
//!
//! # Example
//!
//! ```no_run
//! use tidewatch::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("tidewatch.toml")).unwrap();
//! println!("Crawler will visit at most {} pages", config.crawler.max_pages);
//! ```

mod env;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FetcherConfig, ListingLayout, OutputConfig};

pub use env::{parse_bool_flag, parse_page_count, EnvOverrides, RunOptions};
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
