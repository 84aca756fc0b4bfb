//! Output module for crawl results
//!
//! This module handles:
//! - Writing the crawl result as a single JSON document
//! - Computing and printing per-category crawl statistics

mod json;
pub mod stats;

pub use json::{to_json_string, write_json};
pub use stats::{print_statistics, CategorySummary, CrawlStatistics};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
