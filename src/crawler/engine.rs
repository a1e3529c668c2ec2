//! Incremental crawl engine
//!
//! Walks the listing pagination one page at a time:
//!
//! 1. Fetch the page through the [`PageSource`]
//! 2. Parse records and the next-page link
//! 3. Keep the records the [`CutoffPolicy`] accepts
//! 4. Decide whether to continue, then pause before the next fetch
//!
//! Pages are strictly sequential because each page names its successor. A
//! failed page ends the crawl but keeps everything gathered before it.

use crate::article::Article;
use crate::config::{CrawlerConfig, ListingLayout};
use crate::crawler::cutoff::CutoffPolicy;
use crate::crawler::fetcher::PageSource;
use crate::crawler::parser::parse_listing;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Why a crawl stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The page budget was used up
    PageLimit,

    /// The last page had no usable next-page link
    PaginationExhausted,

    /// A cutoff was active and a page had no records newer than it
    ReachedCutoff,

    /// A cutoff was active and a page had fewer in-range records than the
    /// sparse-page threshold (only when configured to stop)
    SparsePage,

    /// A page could not be fetched
    Failed {
        page: u32,
        url: String,
        error: String,
    },
}

impl StopReason {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageLimit => write!(f, "page limit reached"),
            Self::PaginationExhausted => write!(f, "no more pages"),
            Self::ReachedCutoff => write!(f, "reached content older than the cutoff"),
            Self::SparsePage => write!(f, "sparse page, assuming older content follows"),
            Self::Failed { page, url, error } => {
                write!(f, "page {} ({}) failed: {}", page, url, error)
            }
        }
    }
}

/// Result of one crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Accepted records in page order
    pub articles: Vec<Article>,

    /// Number of pages fetched (or attempted, for a failed last page)
    pub pages_visited: u32,

    pub stop_reason: StopReason,
}

/// Tunables of the crawl loop
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub politeness_delay: Duration,
    pub sparse_page_threshold: Option<usize>,
    pub stop_on_sparse_page: bool,
}

impl EngineSettings {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            politeness_delay: Duration::from_millis(config.politeness_delay_ms),
            sparse_page_threshold: config.sparse_page_threshold,
            stop_on_sparse_page: config.stop_on_sparse_page,
        }
    }
}

/// Drives fetcher and parser across listing pages
pub struct IncrementalCrawler<'a, S: PageSource> {
    source: &'a S,
    layout: &'a ListingLayout,
    settings: EngineSettings,
}

impl<'a, S: PageSource> IncrementalCrawler<'a, S> {
    pub fn new(source: &'a S, layout: &'a ListingLayout, settings: EngineSettings) -> Self {
        Self {
            source,
            layout,
            settings,
        }
    }

    /// Crawls from `start_url`, visiting at most `max_pages` pages
    ///
    /// Never fails: fetch errors end the crawl with [`StopReason::Failed`]
    /// and the records gathered so far.
    pub async fn crawl(&self, start_url: &Url, cutoff: CutoffPolicy, max_pages: u32) -> CrawlReport {
        match cutoff.cutoff() {
            Some(time) => tracing::info!(
                "Incremental crawl: looking for articles newer than {}",
                time.to_rfc3339()
            ),
            None => tracing::info!("Full crawl: collecting all available articles"),
        }

        let mut articles = Vec::new();
        let mut pages_visited = 0u32;
        let mut current = start_url.clone();

        let stop_reason = loop {
            if pages_visited >= max_pages {
                break StopReason::PageLimit;
            }
            pages_visited += 1;
            tracing::info!("Crawling page {}: {}", pages_visited, current);

            let html = match self.source.fetch_page(current.as_str()).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::error!("Error crawling page {}: {}", pages_visited, e);
                    break StopReason::Failed {
                        page: pages_visited,
                        url: current.to_string(),
                        error: e.to_string(),
                    };
                }
            };

            let listing = parse_listing(&html, &current, self.layout);
            let found = listing.articles.len();
            let accepted: Vec<Article> = listing
                .articles
                .into_iter()
                .filter(|article| {
                    let keep = cutoff.accepts(article);
                    if !keep {
                        tracing::debug!("Skipping old article: {} ({})", article.title, article.date);
                    }
                    keep
                })
                .collect();
            let accepted_count = accepted.len();

            if accepted.is_empty() {
                if cutoff.is_active() {
                    tracing::info!(
                        "No new articles on page {} ({} listed), assuming we've reached old content",
                        pages_visited,
                        found
                    );
                    break StopReason::ReachedCutoff;
                }
                tracing::warn!("No articles found on page {}", pages_visited);
            } else {
                articles.extend(accepted);
                tracing::info!(
                    "Found {} new articles on page {}",
                    accepted_count,
                    pages_visited
                );
            }

            if self.is_sparse(&cutoff, accepted_count) {
                tracing::info!(
                    "Page {} had only {} new articles, might be reaching old content",
                    pages_visited,
                    accepted_count
                );
                if self.settings.stop_on_sparse_page {
                    break StopReason::SparsePage;
                }
            }

            let Some(next) = listing.next_page else {
                tracing::info!("No more pages found");
                break StopReason::PaginationExhausted;
            };

            if pages_visited >= max_pages {
                break StopReason::PageLimit;
            }

            tracing::debug!("Found next page: {}", next);
            tokio::time::sleep(self.settings.politeness_delay).await;
            current = next;
        };

        tracing::info!(
            "Crawl finished after {} pages ({}). New articles found: {}",
            pages_visited,
            stop_reason,
            articles.len()
        );

        CrawlReport {
            articles,
            pages_visited,
            stop_reason,
        }
    }

    fn is_sparse(&self, cutoff: &CutoffPolicy, accepted: usize) -> bool {
        cutoff.is_active()
            && accepted > 0
            && self
                .settings
                .sparse_page_threshold
                .is_some_and(|threshold| accepted < threshold)
    }
}
