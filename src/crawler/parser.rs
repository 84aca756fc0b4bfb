//! HTML parsing for listing and product pages
//!
//! This module turns raw markup into the plain data the pipeline works with:
//! - Product links and the raw product-card count of a listing page
//! - The text of the structured-schema and page-init script blocks of a product page
//!
//! Parsed documents never leave this module, so no `Html` value is held
//! across an await point.

use crate::config::SiteConfig;
use crate::ConfigError;
use scraper::{Html, Selector};
use url::Url;

/// Selectors for the storefront's templates, compiled once per crawl
#[derive(Debug, Clone)]
pub struct SiteSelectors {
    product_link: Selector,
    page_init: Selector,
    schema: Selector,
}

impl SiteSelectors {
    /// Compiles the selectors named in the site configuration
    pub fn from_config(config: &SiteConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            product_link: compile(&config.product_link_selector)?,
            page_init: compile(&config.page_init_selector)?,
            schema: compile(&config.schema_selector)?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {}", selector, e)))
}

/// Extracted information from a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    /// Absolute product URLs, in document order
    pub links: Vec<String>,

    /// Number of product cards matched, including cards without a usable href
    pub product_count: usize,
}

/// Script blocks of a product page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPage {
    /// Text of the first structured-schema block, if any
    pub schema_block: Option<String>,

    /// Text of every page-init block, in document order
    pub init_blocks: Vec<String>,
}

/// Parses a listing page
///
/// Every element matching the product-card selector counts towards
/// `product_count`; only those with a resolvable `href` contribute a link.
///
/// # Example
///
/// ```no_run
/// use catalog_harvest::config::load_config;
/// use catalog_harvest::crawler::{parse_listing, SiteSelectors};
/// use std::path::Path;
/// use url::Url;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// let selectors = SiteSelectors::from_config(&config.site).unwrap();
/// let html = r#"<a class="product photo product-item-photo" href="/p/1.html"></a>"#;
/// let page_url = Url::parse("https://stevens.com.pa/dama/ropa-de-dama/abrigos.html?p=1").unwrap();
/// let listing = parse_listing(html, &selectors, &page_url);
/// assert_eq!(listing.product_count, 1);
/// ```
pub fn parse_listing(html: &str, selectors: &SiteSelectors, page_url: &Url) -> ListingPage {
    let document = Html::parse_document(html);

    let mut product_count = 0;
    let mut links = Vec::new();

    for element in document.select(&selectors.product_link) {
        product_count += 1;

        match element.value().attr("href") {
            Some(href) => match resolve_link(href, page_url) {
                Some(url) => links.push(url),
                None => tracing::debug!("Skipping unusable product href '{}'", href),
            },
            None => tracing::debug!("Skipping product card without href on {}", page_url),
        }
    }

    ListingPage {
        links,
        product_count,
    }
}

/// Parses a product page and collects its embedded script blocks
pub fn parse_product_page(html: &str, selectors: &SiteSelectors) -> ProductPage {
    let document = Html::parse_document(html);

    let schema_block = document
        .select(&selectors.schema)
        .next()
        .map(|element| element.text().collect::<String>());

    let init_blocks = document
        .select(&selectors.page_init)
        .map(|element| element.text().collect::<String>())
        .collect();

    ProductPage {
        schema_block,
        init_blocks,
    }
}

/// Resolves a link href to an absolute HTTP(S) URL
///
/// Returns None for empty hrefs, fragment-only links, non-web schemes,
/// and anything that does not parse.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
