//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with browser-like default headers
//! - Rotating the user agent across attempts
//! - Retry with exponential backoff (see [`RetryPolicy`])
//! - Detecting block pages (suspiciously short bodies, block phrases)
//! - A single-shot connectivity probe run before a crawl

use crate::config::FetcherConfig;
use crate::crawler::retry::RetryPolicy;
use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while fetching a listing page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Response from {url} too short ({length} chars), possible block")]
    ShortBody { url: String, length: usize },

    #[error("Blocked by {url} (matched '{indicator}')")]
    Blocked { url: String, indicator: String },

    #[error("Request failed for {url}: {message}")]
    Request { url: String, message: String },

    #[error("Failed to fetch {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Returns true for timeout-class failures (longer backoff)
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns true if the response looked like a block page
    pub fn is_block(&self) -> bool {
        matches!(self, Self::Blocked { .. } | Self::ShortBody { .. })
    }

    /// Returns true if another attempt may succeed
    ///
    /// Client errors other than 408 and 429 are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            Self::Exhausted { .. } => false,
            _ => true,
        }
    }
}

/// Source of listing page markup
///
/// The crawl engine only talks to this trait, so tests can serve pages from
/// memory.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches the markup of one listing page
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;

    /// Checks once, without retries, that the site is reachable at all
    async fn check_connectivity(&self, url: &str) -> Result<(), FetchError>;
}

/// Builds an HTTP client with browser-like default headers
///
/// The user agent is not set here; [`Fetcher`] sets it per attempt.
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    match HeaderValue::from_str(&config.accept_language) {
        Ok(value) => {
            headers.insert(header::ACCEPT_LANGUAGE, value);
        }
        Err(_) => tracing::warn!(
            "Ignoring invalid accept_language value: {}",
            config.accept_language
        ),
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );

    Client::builder()
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches listing pages with retry, user-agent rotation, and block detection
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
    user_agents: Vec<String>,
    block_indicators: Vec<String>,
    min_body_length: usize,
    timeout: Duration,
    timeout_step: Duration,
    probe_timeout: Duration,
}

impl Fetcher {
    /// Creates a fetcher from configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidewatch::config::FetcherConfig;
    /// use tidewatch::crawler::Fetcher;
    ///
    /// let fetcher = Fetcher::new(&FetcherConfig::default()).unwrap();
    /// ```
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;

        let user_agents = if config.user_agents.is_empty() {
            FetcherConfig::default().user_agents
        } else {
            config.user_agents.clone()
        };

        Ok(Self {
            client,
            policy: RetryPolicy::from_config(config),
            user_agents,
            block_indicators: config
                .block_indicators
                .iter()
                .map(|i| i.to_lowercase())
                .collect(),
            min_body_length: config.min_body_length,
            timeout: Duration::from_secs(config.timeout_secs),
            timeout_step: Duration::from_secs(config.timeout_step_secs),
            probe_timeout: Duration::from_secs(config.connect_timeout_secs),
        })
    }

    /// Replaces the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// User agent for an attempt, rotating from a per-fetch starting offset
    pub fn user_agent_for(&self, offset: usize, attempt: u32) -> &str {
        let index = (offset + attempt as usize) % self.user_agents.len();
        &self.user_agents[index]
    }

    /// Socket timeout for an attempt; later attempts get more time
    pub fn attempt_timeout(&self, attempt: u32) -> Duration {
        self.timeout
            .saturating_add(self.timeout_step.saturating_mul(attempt))
    }

    /// Returns the first block indicator found in `body`, if any
    pub fn detect_block(&self, body: &str) -> Option<&str> {
        let lower = body.to_lowercase();
        self.block_indicators
            .iter()
            .find(|indicator| lower.contains(indicator.as_str()))
            .map(|indicator| indicator.as_str())
    }

    /// Rejects bodies that look like block pages
    fn inspect_body(&self, url: &str, body: String) -> Result<String, FetchError> {
        let length = body.chars().count();
        if length < self.min_body_length {
            return Err(FetchError::ShortBody {
                url: url.to_string(),
                length,
            });
        }

        if let Some(indicator) = self.detect_block(&body) {
            let preview: String = body.chars().take(200).collect();
            tracing::error!("Blocking detected at {}. Preview: {}", url, preview);
            return Err(FetchError::Blocked {
                url: url.to_string(),
                indicator: indicator.to_string(),
            });
        }

        Ok(body)
    }

    /// Performs a single GET attempt
    async fn fetch_once(&self, url: &str, attempt: u32, offset: usize) -> Result<String, FetchError> {
        tracing::info!(
            "Fetching URL: {} (attempt {}/{})",
            url,
            attempt + 1,
            self.policy.max_attempts
        );

        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, self.user_agent_for(offset, attempt))
            .timeout(self.attempt_timeout(attempt))
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| classify_error(url, e))?;
        let body = self.inspect_body(url, body)?;

        tracing::info!("Successfully fetched {} characters", body.chars().count());
        Ok(body)
    }
}

#[async_trait]
impl PageSource for Fetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let offset = rand::rng().random_range(0..self.user_agents.len());
        self.policy
            .retry(url, |attempt| self.fetch_once(url, attempt, offset))
            .await
    }

    async fn check_connectivity(&self, url: &str) -> Result<(), FetchError> {
        let response = self
            .client
            .head(url)
            .header(header::USER_AGENT, self.user_agent_for(0, 0))
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        // Any HTTP status counts as reachable
        let status: StatusCode = response.status();
        tracing::debug!("Connectivity check for {} returned {}", url, status);
        Ok(())
    }
}

/// Maps a reqwest error onto the fetch error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
