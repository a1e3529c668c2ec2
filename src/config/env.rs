//! Run options and strict environment overrides
//!
//! Schedulers and CI jobs drive the tracker through environment variables.
//! Every variable is parsed strictly: a value that is present but not
//! understood is an error rather than a silent default.

use crate::config::types::Config;
use crate::ConfigError;

pub const ENV_MAX_PAGES: &str = "MAX_PAGES";
pub const ENV_FORCE_FULL_CRAWL: &str = "FORCE_FULL_CRAWL";
pub const ENV_OUTPUT_JSON: &str = "OUTPUT_JSON";
pub const ENV_OUTPUT_CSV: &str = "OUTPUT_CSV";
pub const ENV_STATE_FILE: &str = "STATE_FILE";

/// Per-invocation parameters of a tracker run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Page budget for an incremental crawl
    pub max_pages: u32,

    /// Ignore the cutoff and replace the record set with a fresh crawl
    pub force_full_crawl: bool,
}

impl RunOptions {
    /// Builds run options from the configured defaults
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_pages: config.crawler.max_pages,
            force_full_crawl: false,
        }
    }

    /// Page budget for this run
    ///
    /// A full crawl doubles the budget, capped at `ceiling`. The cap also
    /// applies when `max_pages` alone is above it.
    pub fn effective_max_pages(&self, full_crawl: bool, ceiling: u32) -> u32 {
        if full_crawl {
            self.max_pages.saturating_mul(2).min(ceiling)
        } else {
            self.max_pages
        }
    }
}

/// Overrides read from the process environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub max_pages: Option<u32>,
    pub force_full_crawl: Option<bool>,
    pub json_path: Option<String>,
    pub csv_path: Option<String>,
    pub state_path: Option<String>,
}

impl EnvOverrides {
    /// Reads overrides from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads overrides through an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_pages = lookup(ENV_MAX_PAGES)
            .map(|v| parse_page_count(ENV_MAX_PAGES, &v))
            .transpose()?;
        let force_full_crawl = lookup(ENV_FORCE_FULL_CRAWL)
            .map(|v| parse_bool_flag(ENV_FORCE_FULL_CRAWL, &v))
            .transpose()?;
        let json_path = lookup(ENV_OUTPUT_JSON)
            .map(|v| parse_path(ENV_OUTPUT_JSON, &v))
            .transpose()?;
        let csv_path = lookup(ENV_OUTPUT_CSV)
            .map(|v| parse_path(ENV_OUTPUT_CSV, &v))
            .transpose()?;
        let state_path = lookup(ENV_STATE_FILE)
            .map(|v| parse_path(ENV_STATE_FILE, &v))
            .transpose()?;

        Ok(Self {
            max_pages,
            force_full_crawl,
            json_path,
            csv_path,
            state_path,
        })
    }

    /// Applies the overrides on top of a loaded config and run options
    pub fn apply(&self, config: &mut Config, options: &mut RunOptions) {
        if let Some(max_pages) = self.max_pages {
            options.max_pages = max_pages;
        }
        if let Some(force) = self.force_full_crawl {
            options.force_full_crawl = force;
        }
        if let Some(path) = &self.json_path {
            config.output.json_path = path.clone();
        }
        if let Some(path) = &self.csv_path {
            config.output.csv_path = Some(path.clone());
        }
        if let Some(path) = &self.state_path {
            config.output.state_path = path.clone();
        }
    }
}

/// Parses a boolean flag, accepting only well-known spellings
pub fn parse_bool_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(invalid(name, value, "expected true/false, 1/0, or yes/no")),
    }
}

/// Parses a positive page count
pub fn parse_page_count(name: &str, value: &str) -> Result<u32, ConfigError> {
    let pages: u32 = value
        .trim()
        .parse()
        .map_err(|_| invalid(name, value, "expected a positive integer"))?;

    if pages == 0 {
        return Err(invalid(name, value, "must be at least 1"));
    }

    Ok(pages)
}

fn parse_path(name: &str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid(name, value, "path cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn invalid(name: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
