//! Integration tests for the tracker
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full fetch, parse, merge, persist cycle end-to-end.

mod common;
mod crawl_tests;
mod fetch_tests;
