//! Fetcher behavior against a mock server

use crate::common::listing_page;
use tidewatch::config::FetcherConfig;
use tidewatch::crawler::{FetchError, Fetcher, PageSource, RetryPolicy};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_fetcher(attempts: u32) -> Fetcher {
    let config = FetcherConfig {
        timeout_secs: 5,
        connect_timeout_secs: 2,
        ..FetcherConfig::default()
    };
    Fetcher::new(&config)
        .expect("Failed to build fetcher")
        .with_policy(RetryPolicy::immediate(attempts))
}

fn sample_page() -> String {
    listing_page(&[("a", "2024-05-06")], None)
}

#[tokio::test]
async fn test_fetch_sends_browser_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zq"))
        .and(header_exists("user-agent"))
        .and(header("accept-language", "zh-CN,zh;q=0.9,en;q=0.8"))
        .and(header("cache-control", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_page()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(3);
    let body = fetcher
        .fetch_page(&format!("{}/zq", mock_server.uri()))
        .await
        .expect("Fetch should succeed");

    assert!(body.contains("cc-list-content"));
}

#[tokio::test]
async fn test_fetch_retries_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zq"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/zq"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_page()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(3);
    let result = fetcher.fetch_page(&format!("{}/zq", mock_server.uri())).await;

    assert!(result.is_ok(), "Expected success after retries: {:?}", result);
}

#[tokio::test]
async fn test_fetch_does_not_retry_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zq"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(5);
    let result = fetcher.fetch_page(&format!("{}/zq", mock_server.uri())).await;

    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
}

#[tokio::test]
async fn test_short_body_exhausts_retry_budget() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zq"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(3);
    let result = fetcher.fetch_page(&format!("{}/zq", mock_server.uri())).await;

    match result {
        Err(FetchError::Exhausted { attempts, last, .. }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last, FetchError::ShortBody { .. }));
        }
        other => panic!("Expected exhausted retries, got {:?}", other),
    }
}

#[tokio::test]
async fn test_block_page_detected() {
    let mock_server = MockServer::start().await;
    let block_page = format!(
        "<html><body><h1>Access Denied</h1><p>{}</p></body></html>",
        "Please complete the security check to continue. ".repeat(4)
    );

    Mock::given(method("GET"))
        .and(path("/zq"))
        .respond_with(ResponseTemplate::new(200).set_body_string(block_page))
        .expect(2)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(2);
    let result = fetcher.fetch_page(&format!("{}/zq", mock_server.uri())).await;

    match result {
        Err(FetchError::Exhausted { last, .. }) => match *last {
            FetchError::Blocked { indicator, .. } => assert_eq!(indicator, "access denied"),
            other => panic!("Expected block detection, got {:?}", other),
        },
        other => panic!("Expected exhausted retries, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connectivity_accepts_any_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(3);
    let result = fetcher
        .check_connectivity(&format!("{}/zq", mock_server.uri()))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_connectivity_fails_on_closed_port() {
    let fetcher = create_fetcher(3);
    let result = fetcher.check_connectivity("http://127.0.0.1:1/zq").await;

    assert!(result.is_err());
}
