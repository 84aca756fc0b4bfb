//! Category pipeline
//!
//! Drives one category from page 1 until a stop condition fires:
//! - the listing page could not be fetched
//! - the listing page had no product cards
//! - the listing page had fewer cards than a full page
//! - the configured `max-pages` bound was reached
//!
//! Pages are strictly sequential. Within a page every product runs
//! fetch -> extract -> resolve concurrently with its siblings, and finished
//! records are appended in link order. A product that fails at any stage is
//! dropped without affecting its siblings.

use crate::catalog::{CategoryResult, ProductRecord};
use crate::config::Config;
use crate::crawler::extractor::extract_product;
use crate::crawler::fetcher::{FetchOutcome, Transport};
use crate::crawler::parser::{parse_product_page, SiteSelectors};
use crate::crawler::resolver::VariantResolver;
use crate::crawler::scanner::{PageScanner, PageVerdict};
use crate::crawler::scheduler::run_ordered;
use chrono::Local;
use tracing::Instrument;

/// Crawls one category at a time; shared by every concurrently running category
pub struct CategoryPipeline<'a> {
    config: &'a Config,
    transport: &'a Transport,
    selectors: &'a SiteSelectors,
    scanner: PageScanner<'a>,
    resolver: VariantResolver<'a>,
}

impl<'a> CategoryPipeline<'a> {
    pub fn new(config: &'a Config, transport: &'a Transport, selectors: &'a SiteSelectors) -> Self {
        Self {
            config,
            transport,
            selectors,
            scanner: PageScanner::new(transport, selectors, &config.site),
            resolver: VariantResolver::new(
                transport,
                &config.site,
                config.client.max_concurrent_variants,
            ),
        }
    }

    /// Runs the full pagination loop for `category`
    ///
    /// # Returns
    ///
    /// The products of every scanned page, in page order and, within a page,
    /// in link order.
    pub async fn run(&self, category: &str) -> CategoryResult {
        let mut result = CategoryResult::new(category);
        let page_size = self.config.site.page_size;
        let mut page: u32 = 1;

        loop {
            if let Some(max_pages) = self.config.site.max_pages {
                if page > max_pages {
                    tracing::warn!("Reached max-pages ({}), ending pagination", max_pages);
                    break;
                }
            }

            let Some(listing) = self.scanner.scan(category, page).await else {
                result.stats.truncated = true;
                break;
            };
            result.stats.pages_scanned += 1;

            let verdict = PageVerdict::from_count(listing.product_count, page_size);
            if verdict == PageVerdict::Empty {
                tracing::info!("No products on page {}, ending pagination", page);
                break;
            }

            result.stats.links_found += listing.links.len();
            let records = self.process_page(category, page, &listing.links).await;

            for record in records {
                match record {
                    Some(record) => {
                        let resolved = record.variants.iter().filter(|v| v.is_resolved()).count();
                        result.stats.variants_resolved += resolved;
                        result.stats.variants_unresolved += record.variants.len() - resolved;
                        result.products.push(record);
                    }
                    None => result.stats.products_skipped += 1,
                }
            }

            if verdict == PageVerdict::ShortPage {
                tracing::info!(
                    "Page {} has fewer than {} products, ending pagination",
                    page,
                    page_size
                );
                break;
            }

            page += 1;
        }

        tracing::info!(
            "Category finished: {} products from {} pages ({} skipped)",
            result.products.len(),
            result.stats.pages_scanned,
            result.stats.products_skipped
        );

        result
    }

    /// Processes every product of one listing page; `None` marks a skipped product
    async fn process_page(
        &self,
        category: &str,
        page: u32,
        links: &[String],
    ) -> Vec<Option<ProductRecord>> {
        let this = self;
        run_ordered(
            links,
            self.config.client.max_concurrent_products,
            move |index, url| {
                let span = tracing::info_span!("product", page, index = index + 1);
                this.process_product(category, url).instrument(span)
            },
        )
        .await
    }

    /// Fetch -> extract -> resolve for a single product page
    async fn process_product(&self, category: &str, url: &str) -> Option<ProductRecord> {
        let body = match self.transport.get(url).await {
            FetchOutcome::Success { body, .. } => body,
            other => {
                tracing::warn!("Skipping product page {}: {}", url, other);
                return None;
            }
        };

        let page = parse_product_page(&body, self.selectors);
        let source = match extract_product(&page, &self.config.site) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!("Skipping product page {}: {}", url, e);
                return None;
            }
        };

        let captured_at = Local::now().naive_local();
        tracing::debug!(
            "Resolving {} variants of product {:?} ({})",
            source.combination_count(),
            source.product_id,
            url
        );
        let variants = self.resolver.resolve(&source).await;

        Some(ProductRecord::assemble(
            source,
            category,
            &self.config.store,
            captured_at,
            variants,
        ))
    }
}
