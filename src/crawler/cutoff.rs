//! Time cutoff for incremental crawls
//!
//! Listing dates are printed in the site's own format and are not always
//! parseable. A record with an unparseable date is always treated as newer
//! than the cutoff so ambiguous content is never dropped silently.

use crate::article::Article;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

/// Date-time formats tried before falling back to plain dates
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Plain date formats; parsed as midnight UTC
const DATE_FORMATS: &[&str] = &["%Y-%m-%d"];

/// Parses an article date string as a UTC timestamp
///
/// Returns `None` when the string matches none of the known formats.
pub fn parse_article_date(date: &str) -> Option<DateTime<Utc>> {
    let date = date.trim();
    if date.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(date, format) {
            return Some(parsed.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(date, format) {
            return parsed.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}

/// Returns true if the article date is strictly newer than the cutoff
///
/// Unparseable dates count as newer.
pub fn is_newer_than(date: &str, cutoff: DateTime<Utc>) -> bool {
    match parse_article_date(date) {
        Some(published) => published > cutoff,
        None => {
            tracing::debug!("Unable to parse date '{}', including article", date);
            true
        }
    }
}

/// Decides which records an incremental crawl accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CutoffPolicy {
    cutoff: Option<DateTime<Utc>>,
}

impl CutoffPolicy {
    /// No cutoff: every record is accepted (full crawl)
    pub fn none() -> Self {
        Self { cutoff: None }
    }

    /// Accept only records newer than `cutoff`
    pub fn at(cutoff: DateTime<Utc>) -> Self {
        Self {
            cutoff: Some(cutoff),
        }
    }

    /// Cutoff derived from the previous run's timestamp minus a safety buffer
    ///
    /// Without a previous timestamp the policy is inactive.
    pub fn from_last_crawl(last_crawl_time: Option<DateTime<Utc>>, buffer: Duration) -> Self {
        match last_crawl_time {
            Some(last) => Self::at(last - buffer),
            None => Self::none(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.cutoff.is_some()
    }

    pub fn cutoff(&self) -> Option<DateTime<Utc>> {
        self.cutoff
    }

    /// Returns true if the article belongs in this crawl's result
    pub fn accepts(&self, article: &Article) -> bool {
        match self.cutoff {
            Some(cutoff) => is_newer_than(&article.date, cutoff),
            None => true,
        }
    }
}
