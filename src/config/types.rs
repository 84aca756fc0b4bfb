use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for Catalog-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Store identifier copied into every product record
    pub store: String,

    /// Category slugs to crawl, in output order
    pub categories: Vec<String>,

    pub site: SiteConfig,

    pub client: ClientConfig,

    #[serde(default)]
    pub headers: HeaderConfig,

    pub output: OutputConfig,
}

/// Storefront layout: endpoints, listing page size, attribute ids and selectors
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base URL that category slugs are appended to (must end with '/')
    #[serde(rename = "listing-base-url")]
    pub listing_base_url: String,

    /// Endpoint receiving the per-variant lookup POST
    #[serde(rename = "lookup-url")]
    pub lookup_url: String,

    /// Number of product cards on a full listing page
    #[serde(rename = "page-size")]
    pub page_size: usize,

    /// Attribute id of the color swatch
    #[serde(rename = "color-attribute-id")]
    pub color_attribute_id: String,

    /// Attribute id of the size swatch
    #[serde(rename = "size-attribute-id")]
    pub size_attribute_id: String,

    /// Upper bound on listing pages fetched per category
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,

    #[serde(rename = "product-link-selector", default = "default_product_link_selector")]
    pub product_link_selector: String,

    #[serde(rename = "page-init-selector", default = "default_page_init_selector")]
    pub page_init_selector: String,

    #[serde(rename = "schema-selector", default = "default_schema_selector")]
    pub schema_selector: String,

    /// Substring that identifies the swatch configuration among page-init blocks
    #[serde(rename = "swatch-marker", default = "default_swatch_marker")]
    pub swatch_marker: String,
}

/// HTTP client behavior
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Product pages processed at once for a single listing page
    #[serde(rename = "max-concurrent-products", default = "default_concurrency")]
    pub max_concurrent_products: usize,

    /// Variant lookups in flight at once for a single product
    #[serde(rename = "max-concurrent-variants", default = "default_concurrency")]
    pub max_concurrent_variants: usize,
}

/// Fixed headers injected into the transport at construction time
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeaderConfig {
    /// Sent with listing and product page GETs
    #[serde(default)]
    pub page: BTreeMap<String, String>,

    /// Sent with variant lookup POSTs
    #[serde(default)]
    pub lookup: BTreeMap<String, String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON document written after the crawl
    pub path: String,

    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_product_link_selector() -> String {
    "a.product.photo.product-item-photo".to_string()
}

fn default_page_init_selector() -> String {
    "script[type='text/x-magento-init']".to_string()
}

fn default_schema_selector() -> String {
    "script[type='application/ld+json']".to_string()
}

fn default_swatch_marker() -> String {
    "data-role".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_concurrency() -> usize {
    8
}

fn default_pretty() -> bool {
    true
}
