//! Crawler module for the catalog crawl-and-resolve pipeline
//!
//! This module contains the core crawling logic, including:
//! - HTTP transport with fixed, configured headers
//! - Listing and product page parsing
//! - Embedded swatch configuration extraction
//! - Variant lookups for every color x size combination
//! - Per-category pagination and cross-category orchestration

mod coordinator;
mod extractor;
mod fetcher;
mod parser;
mod pipeline;
mod resolver;
mod scanner;
mod scheduler;

pub use coordinator::Harvester;
pub use extractor::{extract_product, ExtractError};
pub use fetcher::{build_header_map, build_http_client, FetchOutcome, Transport};
pub use parser::{parse_listing, parse_product_page, ListingPage, ProductPage, SiteSelectors};
pub use pipeline::CategoryPipeline;
pub use resolver::{combinations, lookup_payload, VariantResolver};
pub use scanner::{listing_url, PageScanner, PageVerdict};
pub use scheduler::run_ordered;

use crate::catalog::CrawlResult;
use crate::config::Config;
use crate::HarvestError;

/// Runs a complete harvest
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the shared HTTP transport
/// 2. Compile the site selectors
/// 3. Crawl every configured category concurrently
///
/// # Arguments
///
/// * `config` - The harvest configuration
///
/// # Returns
///
/// * `Ok(CrawlResult)` - One result per configured category, in configured order
/// * `Err(HarvestError)` - The crawl could not be set up
///
/// # Example
///
/// ```no_run
/// use catalog_harvest::config::load_config;
/// use catalog_harvest::crawler::harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let result = harvest(config).await?;
/// println!("{} products", result.total_products());
/// # Ok(())
/// # }
/// ```
pub async fn harvest(config: Config) -> Result<CrawlResult, HarvestError> {
    let harvester = Harvester::new(config)?;
    Ok(harvester.run().await)
}
