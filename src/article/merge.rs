use crate::article::Article;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Merges freshly crawled articles into a previously persisted set
///
/// Only the first record seen for a URL is kept, scanning `existing` before
/// `new`, so duplicates already persisted in `existing` collapse too. The combined set is sorted newest first; the sort is
/// stable, so equal dates keep insertion order (existing before new), and
/// dates that cannot be parsed sort last.
///
/// # Example
///
/// ```
/// use tidewatch::article::{merge_articles, Article};
///
/// let existing = vec![Article::new("Old", "2024-01-01", "https://example.com/a")];
/// let new = vec![
///     Article::new("Old", "2024-01-01", "https://example.com/a"),
///     Article::new("New", "2024-01-02", "https://example.com/b"),
/// ];
///
/// let merged = merge_articles(existing, new);
/// assert_eq!(merged.len(), 2);
/// assert_eq!(merged[0].url, "https://example.com/b");
/// ```
pub fn merge_articles(existing: Vec<Article>, new: Vec<Article>) -> Vec<Article> {
    let mut seen: HashSet<String> = HashSet::with_capacity(existing.len() + new.len());
    let mut merged = Vec::with_capacity(existing.len() + new.len());

    for article in existing {
        if seen.insert(article.url.clone()) {
            merged.push(article);
        } else {
            tracing::warn!("Dropping duplicate persisted article: {}", article.url);
        }
    }

    let existing_count = merged.len();
    for article in new {
        if seen.insert(article.url.clone()) {
            merged.push(article);
        } else {
            tracing::debug!("Skipping duplicate article: {}", article.url);
        }
    }
    let added = merged.len() - existing_count;

    merged.sort_by(|a, b| sort_key(b).cmp(&sort_key(a)));

    tracing::info!(
        "Merged articles: {} existing + {} new = {} total",
        existing_count,
        added,
        merged.len()
    );

    merged
}

fn sort_key(article: &Article) -> DateTime<Utc> {
    article.published_at().unwrap_or(DateTime::<Utc>::MIN_UTC)
}
