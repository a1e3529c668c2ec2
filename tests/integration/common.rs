//! Shared fixtures for the integration tests

use tempfile::TempDir;
use tidewatch::config::{Config, OutputConfig};

/// Renders a listing page in the site's markup
///
/// `entries` are `(slug, date)` pairs; `next` is the href of the next-page
/// control, or `None` for a disabled control.
pub fn listing_page(entries: &[(&str, &str)], next: Option<&str>) -> String {
    let items: String = entries
        .iter()
        .map(|(slug, date)| {
            format!(
                r#"<li><a href="/mnews/{slug}.shtml" title="Report {slug}" target="_blank">Report {slug}</a><span>{date}</span></li>"#
            )
        })
        .collect();
    let paging = match next {
        Some(href) => format!(r#"<a href="/zq/">首页</a><a href="{href}">下一页</a>"#),
        None => r#"<a href="/zq/">首页</a><a class="disable" href="javascript:;">下一页</a>"#
            .to_string(),
    };
    format!(
        r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>氢能快讯 - 北极星氢能网</title></head>
<body>
<div class="cc-list-content"><ul>{items}</ul></div>
<div class="cc-paging">{paging}</div>
</body></html>"#
    )
}

/// Creates a test configuration pointing at `start_url` with files in `dir`
///
/// Delays are zeroed and each page gets two attempts.
pub fn create_test_config(start_url: &str, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.crawler.start_url = start_url.to_string();
    config.crawler.politeness_delay_ms = 0;
    config.fetcher.max_retries = 2;
    config.fetcher.backoff_base_ms = 0;
    config.fetcher.timeout_penalty_ms = 0;
    config.fetcher.generic_penalty_ms = 0;
    config.fetcher.timeout_secs = 5;
    config.fetcher.connect_timeout_secs = 2;
    config.output = OutputConfig {
        json_path: dir.path().join("articles.json").display().to_string(),
        fallback_json_paths: Vec::new(),
        csv_path: Some(dir.path().join("articles.csv").display().to_string()),
        state_path: dir.path().join("crawl_state.json").display().to_string(),
    };
    config
}

/// Absolute URL of an article slug on the mock server
pub fn article_url(base: &str, slug: &str) -> String {
    format!("{}/mnews/{}.shtml", base, slug)
}
