//! Output module for run results
//!
//! This module handles:
//! - The tagged [`CrawlOutcome`] every run returns
//! - Exporting the record set as CSV
//! - Printing the console summary

mod csv_writer;
mod outcome;
mod summary;

pub use csv_writer::write_csv;
pub use outcome::{CrawlFailure, CrawlOutcome, CrawlSummary, FailureKind};
pub use summary::{print_outcome, render_outcome};
