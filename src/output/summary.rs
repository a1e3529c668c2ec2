//! Console summary of a run
//!
//! The summary goes to stdout. Besides the human-readable lines it carries
//! `NEW_ARTICLES_COUNT=` and `LATEST_ARTICLE_DATE=` lines that CI jobs grep
//! for to decide whether to notify.

use crate::config::OutputConfig;
use crate::output::{CrawlFailure, CrawlOutcome, CrawlSummary};

/// How many of the newest records the summary lists
const LATEST_SHOWN: usize = 3;

/// Renders the summary printed after a run
pub fn render_outcome(outcome: &CrawlOutcome, output: &OutputConfig) -> String {
    match outcome {
        CrawlOutcome::Success(summary) => render_success(summary, output),
        CrawlOutcome::Failure(failure) => render_failure(failure),
    }
}

/// Prints the run summary to stdout
pub fn print_outcome(outcome: &CrawlOutcome, output: &OutputConfig) {
    print!("{}", render_outcome(outcome, output));
}

fn render_success(summary: &CrawlSummary, output: &OutputConfig) -> String {
    let mut lines = Vec::new();

    if summary.network_error.is_some() {
        lines.push(format!(
            "SUCCESS: Served {} existing articles (site unreachable)",
            summary.total_articles_count
        ));
    } else if summary.is_first_run {
        lines.push(format!(
            "SUCCESS: Full crawl completed - {} articles",
            summary.total_articles_count
        ));
    } else {
        if summary.new_articles_count == 0 {
            lines.push("SUCCESS: No new articles found".to_string());
        } else {
            lines.push(format!(
                "SUCCESS: Incremental crawl completed - {} new articles",
                summary.new_articles_count
            ));
        }
        lines.push(format!("Total articles: {}", summary.total_articles_count));
    }
    lines.push(format!("Pages visited: {}", summary.pages_visited));

    let mut files = vec![output.json_path.as_str()];
    if let Some(csv) = &output.csv_path {
        files.push(csv.as_str());
    }
    lines.push(format!("Files: {}", files.join(", ")));

    if let Some(warning) = &summary.warning {
        lines.push(format!("WARNING: {}", warning));
    }

    if let Some(latest) = summary.new_articles.first() {
        lines.push(String::new());
        lines.push("Latest articles:".to_string());
        for (i, article) in summary.new_articles.iter().take(LATEST_SHOWN).enumerate() {
            lines.push(format!("  {}. {}", i + 1, article.title));
            lines.push(format!("     Date: {}", article.date));
            lines.push(format!("     URL: {}", article.url));
        }
        lines.push(String::new());
        lines.push(format!("NEW_ARTICLES_COUNT={}", summary.new_articles_count));
        lines.push(format!("LATEST_ARTICLE_DATE={}", latest.date));
    }

    finish(lines)
}

fn render_failure(failure: &CrawlFailure) -> String {
    let mut lines = vec![format!("ERROR: {} ({})", failure.message, failure.kind)];
    if !failure.details.is_empty() {
        lines.push(format!("Details: {}", failure.details));
    }
    finish(lines)
}

/// Joins lines, each terminated by a newline
fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
