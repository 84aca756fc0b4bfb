//! Crawl orchestration
//!
//! The `Harvester` owns everything shared by a crawl: the configuration, the
//! transport (one connection pool), and the compiled selectors. It runs one
//! category pipeline per category, all concurrently, and assembles the
//! results in the order the categories were requested.

use crate::catalog::CrawlResult;
use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, Transport};
use crate::crawler::parser::SiteSelectors;
use crate::crawler::pipeline::CategoryPipeline;
use crate::HarvestError;
use futures::future::join_all;
use std::time::Instant;
use tracing::Instrument;

/// Main crawl orchestrator
pub struct Harvester {
    config: Config,
    transport: Transport,
    selectors: SiteSelectors,
}

impl Harvester {
    /// Creates a new harvester
    ///
    /// # Arguments
    ///
    /// * `config` - A validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Client built and selectors compiled
    /// * `Err(HarvestError)` - The HTTP client, a header, or a selector could not be built
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.client)?;
        let transport = Transport::new(client, &config.headers)?;
        let selectors = SiteSelectors::from_config(&config.site)?;

        Ok(Self {
            config,
            transport,
            selectors,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Crawls every configured category
    pub async fn run(&self) -> CrawlResult {
        self.run_categories(&self.config.categories).await
    }

    /// Crawls the given categories concurrently
    ///
    /// The result holds one `CategoryResult` per input category, in input
    /// order, regardless of which category finished first.
    pub async fn run_categories(&self, categories: &[String]) -> CrawlResult {
        let start_time = Instant::now();
        tracing::info!("Starting harvest of {} categories", categories.len());

        let pipeline = CategoryPipeline::new(&self.config, &self.transport, &self.selectors);
        let pipeline = &pipeline;

        let results = join_all(categories.iter().map(move |category| {
            let span = tracing::info_span!("category", name = %category);
            pipeline.run(category).instrument(span)
        }))
        .await;

        let result = CrawlResult {
            categories: results,
        };

        tracing::info!(
            "All categories have been scraped: {} products in {:?}",
            result.total_products(),
            start_time.elapsed()
        );

        result
    }
}
