//! Listing page scanner
//!
//! Fetches one listing page of a category and returns its product links.
//! Whether another page follows is decided by the category pipeline from the
//! returned `product_count`.

use crate::config::SiteConfig;
use crate::crawler::fetcher::{FetchOutcome, Transport};
use crate::crawler::parser::{parse_listing, ListingPage, SiteSelectors};
use url::Url;

/// Builds the URL of a category listing page
///
/// `listing_url("https://stevens.com.pa/dama/ropa-de-dama/", "abrigos", 2)`
/// yields `https://stevens.com.pa/dama/ropa-de-dama/abrigos.html?p=2`.
pub fn listing_url(base_url: &str, category: &str, page: u32) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?.join(&format!("{}.html", category))?;
    url.query_pairs_mut().append_pair("p", &page.to_string());
    Ok(url)
}

/// Why a listing page ended pagination, if it did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageVerdict {
    /// A full page: fetch the next one
    Continue,

    /// No product cards at all
    Empty,

    /// Fewer cards than a full page: this was the last page
    ShortPage,
}

impl PageVerdict {
    /// Classifies a listing page by its raw product-card count
    pub fn from_count(product_count: usize, page_size: usize) -> Self {
        if product_count == 0 {
            Self::Empty
        } else if product_count < page_size {
            Self::ShortPage
        } else {
            Self::Continue
        }
    }

    pub fn is_last(self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// Fetches and parses listing pages for any category
pub struct PageScanner<'a> {
    transport: &'a Transport,
    selectors: &'a SiteSelectors,
    site: &'a SiteConfig,
}

impl<'a> PageScanner<'a> {
    pub fn new(transport: &'a Transport, selectors: &'a SiteSelectors, site: &'a SiteConfig) -> Self {
        Self {
            transport,
            selectors,
            site,
        }
    }

    /// Scans one listing page
    ///
    /// # Returns
    ///
    /// * `Some(ListingPage)` - Page fetched; links and raw card count
    /// * `None` - The page could not be fetched; pagination must stop
    pub async fn scan(&self, category: &str, page: u32) -> Option<ListingPage> {
        let url = match listing_url(&self.site.listing_base_url, category, page) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("Cannot build listing URL for page {}: {}", page, e);
                return None;
            }
        };

        tracing::info!("Fetching page {}: {}", page, url);

        let body = match self.transport.get(url.as_str()).await {
            FetchOutcome::Success { body, .. } => body,
            other => {
                tracing::warn!(
                    "No usable response for page {} ({}), stopping pagination",
                    page,
                    other
                );
                return None;
            }
        };

        let listing = parse_listing(&body, self.selectors, &url);

        tracing::info!(
            "Found {} products ({} links) on page {}",
            listing.product_count,
            listing.links.len(),
            page
        );

        Some(listing)
    }
}
