//! End-to-end tracker runs against a mock listing site

use crate::common::{article_url, create_test_config, listing_page};
use chrono::{Duration, Utc};
use tempfile::TempDir;
use tidewatch::config::RunOptions;
use tidewatch::output::FailureKind;
use tidewatch::storage::{ArticleStore, JsonArticleStore};
use tidewatch::{run_tracker, Article, CrawlState, StateStore, TideError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn run_options(max_pages: u32) -> RunOptions {
    RunOptions {
        max_pages,
        force_full_crawl: false,
    }
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn mount_head(server: &MockServer) {
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_first_run_crawls_all_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_head(&mock_server).await;
    mount_page(
        &mock_server,
        "/zq",
        listing_page(&[("a", "2024-05-06"), ("b", "2024-05-05")], Some("/zq/2/")),
    )
    .await;
    mount_page(
        &mock_server,
        "/zq/2/",
        listing_page(&[("b", "2024-05-05"), ("c", "2024-05-04")], None),
    )
    .await;

    let config = create_test_config(&format!("{}/zq", base_url), &dir);
    let outcome = run_tracker(&config, &run_options(10))
        .await
        .expect("Tracker should start");

    let summary = outcome.summary().expect("Run should succeed");
    assert!(summary.is_first_run);
    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.total_articles_count, 3);

    let saved = JsonArticleStore::from_config(&config.output)
        .load_articles()
        .expect("Records should be readable");
    let urls: Vec<String> = saved.into_iter().map(|a| a.url).collect();
    assert_eq!(
        urls,
        vec![
            article_url(&base_url, "a"),
            article_url(&base_url, "b"),
            article_url(&base_url, "c"),
        ]
    );

    let csv = std::fs::read_to_string(dir.path().join("articles.csv")).expect("CSV written");
    assert!(csv.starts_with("title,date,url\n"));
    assert_eq!(csv.lines().count(), 4);

    let state = StateStore::new(&config.output.state_path).load();
    assert!(!state.first_run);
    assert_eq!(state.total_articles_crawled, 3);
}

#[tokio::test]
async fn test_second_run_only_adds_newer_articles() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&format!("{}/zq", base_url), &dir);

    mount_head(&mock_server).await;
    mount_page(
        &mock_server,
        "/zq",
        listing_page(&[("old1", "2024-05-06"), ("old2", "2024-05-05")], None),
    )
    .await;

    let first = run_tracker(&config, &run_options(10))
        .await
        .expect("Tracker should start");
    assert_eq!(first.summary().expect("First run succeeds").total_articles_count, 2);

    // The site publishes two new articles; the old ones move to page 2
    mock_server.reset().await;
    let fresh = (Utc::now() + Duration::minutes(5))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    mount_head(&mock_server).await;
    mount_page(
        &mock_server,
        "/zq",
        listing_page(&[("new1", fresh.as_str()), ("new2", fresh.as_str())], Some("/zq/2/")),
    )
    .await;
    mount_page(
        &mock_server,
        "/zq/2/",
        listing_page(&[("old1", "2024-05-06"), ("old2", "2024-05-05")], Some("/zq/3/")),
    )
    .await;

    let second = run_tracker(&config, &run_options(10))
        .await
        .expect("Tracker should start");

    let summary = second.summary().expect("Second run succeeds");
    assert!(!summary.is_first_run);
    assert_eq!(summary.new_articles_count, 2);
    assert_eq!(summary.total_articles_count, 4);
    // Page 2 has nothing newer than the cutoff, so page 3 is never requested
    assert_eq!(summary.pages_visited, 2);

    let saved = JsonArticleStore::from_config(&config.output)
        .load_articles()
        .expect("Records should be readable");
    assert_eq!(saved.len(), 4);
    assert_eq!(saved[0].url, article_url(&base_url, "new1"));
    assert_eq!(saved[3].url, article_url(&base_url, "old2"));
}

#[tokio::test]
async fn test_page_failure_keeps_earlier_records() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_head(&mock_server).await;
    mount_page(
        &mock_server,
        "/zq",
        listing_page(&[("a", "2024-05-06"), ("b", "2024-05-05")], Some("/zq/2/")),
    )
    .await;
    mount_page(
        &mock_server,
        "/zq/2/",
        listing_page(&[("c", "2024-05-04")], Some("/zq/3/")),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/zq/3/"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&format!("{}/zq", base_url), &dir);
    let outcome = run_tracker(&config, &run_options(10))
        .await
        .expect("Tracker should start");

    let summary = outcome.summary().expect("Partial crawl still succeeds");
    assert_eq!(summary.total_articles_count, 3);
    assert_eq!(summary.pages_visited, 3);
    let warning = summary.warning.as_deref().expect("Partial crawl warns");
    assert!(warning.contains("page 3"));

    let state = StateStore::new(&config.output.state_path).load();
    assert_eq!(state.total_articles_crawled, 3);
    assert!(!state.first_run);
    // Pages past the failure were never seen, so no cutoff is recorded yet
    assert_eq!(state.last_crawl_time, None);
    assert!(state.last_error.as_deref().unwrap().contains("page 3"));
}

#[tokio::test]
async fn test_page_limit_respected() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_head(&mock_server).await;
    for n in 1..=6 {
        let page_path = if n == 1 {
            "/zq".to_string()
        } else {
            format!("/zq/{}/", n)
        };
        let slug = format!("p{}", n);
        let next = format!("/zq/{}/", n + 1);
        mount_page(
            &mock_server,
            &page_path,
            listing_page(&[(slug.as_str(), "2024-05-01")], Some(next.as_str())),
        )
        .await;
    }

    // A first run doubles the budget of 2 to 4 pages
    let config = create_test_config(&format!("{}/zq", base_url), &dir);
    let outcome = run_tracker(&config, &run_options(2))
        .await
        .expect("Tracker should start");

    let summary = outcome.summary().expect("Run should succeed");
    assert_eq!(summary.pages_visited, 4);
    assert_eq!(summary.total_articles_count, 4);
}

#[tokio::test]
async fn test_offline_run_serves_cached_records() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config("http://127.0.0.1:1/zq", &dir);

    let cached = vec![Article::new(
        "Cached report",
        "2024-05-01",
        "https://qn.example.com/mnews/cached.shtml",
    )];
    JsonArticleStore::from_config(&config.output)
        .save_articles(&cached)
        .expect("Seed records");
    let last_crawl = Utc::now() - Duration::hours(6);
    let mut state = CrawlState::default();
    state.record_success(last_crawl, cached.len());
    StateStore::new(&config.output.state_path)
        .try_save(&state)
        .expect("Seed state");

    let outcome = run_tracker(&config, &run_options(10))
        .await
        .expect("Tracker should start");

    let summary = outcome.summary().expect("Degraded run still succeeds");
    assert_eq!(summary.articles, cached);
    assert!(summary.warning.is_some());
    assert!(summary.network_error.is_some());

    let state = StateStore::new(&config.output.state_path).load();
    assert_eq!(state.last_crawl_time, Some(last_crawl));
    assert!(state.last_error.is_some());
}

#[tokio::test]
async fn test_offline_first_run_fails() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config("http://127.0.0.1:1/zq", &dir);

    let outcome = run_tracker(&config, &run_options(10))
        .await
        .expect("Tracker should start");

    let failure = outcome.failure().expect("Run should fail");
    assert_eq!(failure.kind, FailureKind::NetworkUnavailable);
    assert_eq!(outcome.exit_code(), 1);
}

#[tokio::test]
async fn test_invalid_config_rejected_before_crawl() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&format!("{}/zq", mock_server.uri()), &dir);
    config.fetcher.user_agents.clear();

    let result = run_tracker(&config, &run_options(10)).await;

    assert!(matches!(result, Err(TideError::Config(_))));
    assert!(!dir.path().join("crawl_state.json").exists());
}
