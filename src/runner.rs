//! Run orchestration
//!
//! One run goes through these steps:
//!
//! 1. Load the crawl state and decide between a full and an incremental crawl
//! 2. Check that the site is reachable (falling back to persisted data if not)
//! 3. Crawl listing pages up to the cutoff
//! 4. Merge new records into the persisted set
//! 5. Write the record files and the new state
//!
//! Every path ends in a [`CrawlOutcome`]; nothing below this layer aborts a run.

use crate::article::{merge_articles, Article};
use crate::config::{validate, Config, RunOptions};
use crate::crawler::{CutoffPolicy, EngineSettings, Fetcher, IncrementalCrawler, PageSource};
use crate::output::{write_csv, CrawlFailure, CrawlOutcome, CrawlSummary, FailureKind};
use crate::state::{CrawlState, StateStore};
use crate::storage::{ArticleStore, JsonArticleStore};
use crate::TideError;
use chrono::{Duration, Utc};
use std::collections::HashSet;
use std::path::PathBuf;
use url::Url;

/// Drives one run against a page source and a record store
pub struct Tracker<'a, S: PageSource, A: ArticleStore> {
    config: &'a Config,
    source: S,
    store: A,
    state_store: StateStore,
}

impl<'a, S: PageSource, A: ArticleStore> Tracker<'a, S, A> {
    pub fn new(config: &'a Config, source: S, store: A, state_store: StateStore) -> Self {
        Self {
            config,
            source,
            store,
            state_store,
        }
    }

    /// Executes one run
    ///
    /// # Arguments
    ///
    /// * `options` - Page budget and full-crawl flag for this run
    ///
    /// # Returns
    ///
    /// `Success` with the final record set, or `Failure` naming what went
    /// wrong. Both outcomes leave the state file updated.
    pub async fn run(&self, options: &RunOptions) -> CrawlOutcome {
        let mut state = self.state_store.load();
        let full_crawl = self.is_full_crawl(&state, options);

        let start_url = match Url::parse(&self.config.crawler.start_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("Invalid start URL '{}': {}", self.config.crawler.start_url, e);
                return self.fail(
                    &mut state,
                    CrawlFailure::new(
                        FailureKind::InvalidConfig,
                        "Invalid start URL",
                        format!("{}: {}", self.config.crawler.start_url, e),
                    ),
                );
            }
        };

        if self.config.fetcher.preflight_check {
            tracing::info!("Checking network connectivity to {}", start_url);
            if let Err(e) = self.source.check_connectivity(start_url.as_str()).await {
                tracing::error!("Network connectivity check failed: {}", e);
                return self.serve_persisted(&mut state, e.to_string());
            }
        }

        let cutoff = if full_crawl {
            CutoffPolicy::none()
        } else {
            CutoffPolicy::from_last_crawl(
                state.last_crawl_time,
                Duration::minutes(self.config.crawler.cutoff_buffer_minutes),
            )
        };
        let max_pages =
            options.effective_max_pages(full_crawl, self.config.crawler.full_crawl_page_ceiling);
        tracing::info!(
            "Starting {} crawl with up to {} pages",
            if full_crawl { "full" } else { "incremental" },
            max_pages
        );

        let crawler = IncrementalCrawler::new(
            &self.source,
            &self.config.layout,
            EngineSettings::from_config(&self.config.crawler),
        );
        let report = crawler.crawl(&start_url, cutoff, max_pages).await;

        let existing = if full_crawl {
            Vec::new()
        } else {
            match self.store.load_articles() {
                Ok(articles) => articles,
                Err(e) => {
                    tracing::error!("Failed to load existing articles: {}", e);
                    return self.fail(
                        &mut state,
                        CrawlFailure::new(
                            FailureKind::Storage,
                            "Could not read the existing record set",
                            e.to_string(),
                        ),
                    );
                }
            }
        };
        let known: HashSet<String> = existing.iter().map(|a| a.url.clone()).collect();

        let crawled = report.articles.len();
        let final_articles = merge_articles(existing, report.articles);
        let new_articles: Vec<Article> = final_articles
            .iter()
            .filter(|a| !known.contains(&a.url))
            .cloned()
            .collect();

        if final_articles.is_empty() && full_crawl {
            tracing::error!("No articles were found during full crawl");
            return self.fail(
                &mut state,
                CrawlFailure::new(
                    FailureKind::NoArticlesFound,
                    "No articles were found during full crawl",
                    report.stop_reason.to_string(),
                ),
            );
        }

        if new_articles.is_empty() && !full_crawl {
            tracing::info!("No new articles found since last crawl");
        } else {
            tracing::info!(
                "Crawled {} records, {} new, {} total",
                crawled,
                new_articles.len(),
                final_articles.len()
            );
        }

        if let Err(e) = self.store.save_articles(&final_articles) {
            tracing::error!("Failed to save articles: {}", e);
            return self.fail(
                &mut state,
                CrawlFailure::new(
                    FailureKind::Storage,
                    "Could not write the record set",
                    e.to_string(),
                ),
            );
        }

        let mut warnings = Vec::new();
        if report.stop_reason.is_failure() {
            warnings.push(format!("Crawl stopped early: {}", report.stop_reason));
        }
        if let Some(csv_path) = &self.config.output.csv_path {
            if let Err(e) = write_csv(&final_articles, &PathBuf::from(csv_path)) {
                tracing::warn!("Failed to write CSV: {}", e);
                warnings.push(format!("CSV export failed: {}", e));
            }
        }

        if report.stop_reason.is_failure() {
            state.record_partial(
                final_articles.len(),
                format!("Crawl stopped early: {}", report.stop_reason),
            );
        } else {
            state.record_success(Utc::now(), final_articles.len());
        }
        self.state_store.save(&state);

        CrawlOutcome::Success(CrawlSummary {
            new_articles_count: new_articles.len(),
            total_articles_count: final_articles.len(),
            articles: final_articles,
            is_first_run: full_crawl,
            pages_visited: report.pages_visited,
            new_articles,
            warning: (!warnings.is_empty()).then(|| warnings.join("; ")),
            network_error: None,
        })
    }

    fn is_full_crawl(&self, state: &CrawlState, options: &RunOptions) -> bool {
        match full_crawl_reason(state, options, self.store.exists()) {
            Some(reason) => {
                tracing::info!(
                    "Full crawl ({}), records at {}",
                    reason,
                    self.store.location().display()
                );
                true
            }
            None => false,
        }
    }

    /// Degraded mode when the site is unreachable
    fn serve_persisted(&self, state: &mut CrawlState, network_error: String) -> CrawlOutcome {
        let existing = match self.store.load_articles() {
            Ok(articles) => articles,
            Err(e) => {
                tracing::warn!("Could not load cached articles: {}", e);
                Vec::new()
            }
        };

        if existing.is_empty() {
            return self.fail(
                state,
                CrawlFailure::new(
                    FailureKind::NetworkUnavailable,
                    "Network connectivity issue and no cached data available",
                    network_error,
                ),
            );
        }

        tracing::warn!(
            "Site unreachable, returning {} cached articles",
            existing.len()
        );
        state.record_failure(format!("Network unavailable: {}", network_error));
        self.state_store.save(state);

        CrawlOutcome::Success(CrawlSummary {
            new_articles_count: 0,
            total_articles_count: existing.len(),
            articles: existing,
            is_first_run: false,
            pages_visited: 0,
            new_articles: Vec::new(),
            warning: Some("Using cached data due to network issues".to_string()),
            network_error: Some(network_error),
        })
    }

    fn fail(&self, state: &mut CrawlState, failure: CrawlFailure) -> CrawlOutcome {
        state.record_failure(format!("{}: {}", failure.message, failure.details));
        self.state_store.save(state);
        CrawlOutcome::Failure(failure)
    }
}

/// Why a run has to ignore the cutoff, or `None` for an incremental run
///
/// A run is a full crawl when forced, on first run, when the record file is
/// missing, or when there is no timestamp to derive a cutoff from.
pub fn full_crawl_reason(
    state: &CrawlState,
    options: &RunOptions,
    records_exist: bool,
) -> Option<&'static str> {
    if options.force_full_crawl {
        Some("forced")
    } else if state.first_run {
        Some("first run")
    } else if !records_exist {
        Some("no existing records file")
    } else if state.last_crawl_time.is_none() {
        Some("no previous crawl time recorded")
    } else {
        None
    }
}

/// Runs the tracker against the live site with file-backed storage
///
/// The configuration is validated before anything touches the network or the
/// record files. Setup errors are returned as `Err`; everything after that
/// ends in a [`CrawlOutcome`].
///
/// # Example
///
/// ```no_run
/// use tidewatch::config::{Config, RunOptions};
/// use tidewatch::run_tracker;
///
/// # async fn example() -> tidewatch::Result<()> {
/// let config = Config::default();
/// let outcome = run_tracker(&config, &RunOptions::from_config(&config)).await?;
/// println!("exit code {}", outcome.exit_code());
/// # Ok(())
/// # }
/// ```
pub async fn run_tracker(config: &Config, options: &RunOptions) -> Result<CrawlOutcome, TideError> {
    validate(config)?;
    let fetcher = Fetcher::new(&config.fetcher)?;
    let store = JsonArticleStore::from_config(&config.output);
    let state_store = StateStore::new(&config.output.state_path);

    let tracker = Tracker::new(config, fetcher, store, state_store);
    Ok(tracker.run(options).await)
}
