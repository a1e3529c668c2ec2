//! State module for tracking progress across runs
//!
//! # Components
//!
//! - `CrawlState`: last crawl timestamp, last record count, first-run flag
//! - `StateStore`: loads and saves the state file

mod crawl_state;
mod store;

// Re-export main types
pub use crawl_state::CrawlState;
pub use store::StateStore;
