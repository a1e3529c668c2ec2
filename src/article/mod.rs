//! Article records and the merge/dedup stage
//!
//! An [`Article`] is identified by its absolute URL. Records are never
//! mutated after parsing; runs only change which records a set contains.

mod merge;

pub use merge::merge_articles;

use crate::crawler::parse_article_date;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the news listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Headline text
    pub title: String,

    /// Publication date as printed by the site
    pub date: String,

    /// Absolute article URL (identity key)
    pub url: String,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        date: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            date: date.into(),
            url: url.into(),
        }
    }

    /// Parsed publication time, if the date string is in a known format
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        parse_article_date(&self.date)
    }
}
