//! Crawler module for listing page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retries, user-agent rotation and block detection
//! - Listing parsing (records and next-page link)
//! - The time cutoff that makes crawls incremental
//! - The pagination loop that ties them together

mod cutoff;
mod engine;
mod fetcher;
mod parser;
mod retry;

pub use cutoff::{is_newer_than, parse_article_date, CutoffPolicy};
pub use engine::{CrawlReport, EngineSettings, IncrementalCrawler, StopReason};
pub use fetcher::{build_http_client, FetchError, Fetcher, PageSource};
pub use parser::{parse_listing, parse_next_page, parse_records, ParsedListing};
pub use retry::RetryPolicy;
