use crate::catalog::variant::{SwatchOption, VariantRecord};
use crate::catalog::TIMESTAMP_FORMAT;
use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Decoded state of one product page
///
/// Options and prices always come from the same swatch configuration block.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSource {
    /// SKU from the structured-schema block, if it could be read
    pub sku: Option<String>,

    /// Numeric product identifier from the swatch configuration
    pub product_id: Option<u64>,

    /// Image references as published by the storefront
    pub images: Value,

    /// Structured-schema object (empty object when absent or malformed)
    pub schema: Value,

    /// Price table keyed by price-tier identifier
    pub prices: Map<String, Value>,

    pub colors: Vec<SwatchOption>,
    pub sizes: Vec<SwatchOption>,
}

impl ProductSource {
    /// Number of color x size combinations this product expands to
    pub fn combination_count(&self) -> usize {
        self.colors.len() * self.sizes.len()
    }
}

/// A fully assembled product, ready for output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub schema: Value,

    #[serde(rename = "productId")]
    pub product_id: Option<u64>,

    pub images: Value,
    pub sku: Option<String>,
    pub prices: Map<String, Value>,
    pub colors: Vec<SwatchOption>,
    pub sizes: Vec<SwatchOption>,
    pub category: String,
    pub store: String,

    #[serde(rename = "timestamp", serialize_with = "serialize_timestamp")]
    pub captured_at: NaiveDateTime,

    pub variants: Vec<VariantRecord>,
}

impl ProductRecord {
    /// Combines a decoded product with its crawl context and resolved variants
    pub fn assemble(
        source: ProductSource,
        category: &str,
        store: &str,
        captured_at: NaiveDateTime,
        variants: Vec<VariantRecord>,
    ) -> Self {
        Self {
            schema: source.schema,
            product_id: source.product_id,
            images: source.images,
            sku: source.sku,
            prices: source.prices,
            colors: source.colors,
            sizes: source.sizes,
            category: category.to_string(),
            store: store.to_string(),
            captured_at,
            variants,
        }
    }
}

fn serialize_timestamp<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
}

/// Counters collected while crawling one category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryStats {
    /// Listing pages that returned usable content
    pub pages_scanned: u32,

    /// Product links discovered across all listing pages
    pub links_found: usize,

    /// Products dropped because their page could not be fetched or decoded
    pub products_skipped: usize,

    pub variants_resolved: usize,
    pub variants_unresolved: usize,

    /// True when pagination ended because a listing page could not be fetched
    pub truncated: bool,
}

/// Products of one category, in scan order
///
/// Serializes as a plain array of products.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryResult {
    pub category: String,
    pub products: Vec<ProductRecord>,
    pub stats: CategoryStats,
}

impl CategoryResult {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }
}

impl Serialize for CategoryResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.products.serialize(serializer)
    }
}

/// Results for every requested category, in request order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CrawlResult {
    pub categories: Vec<CategoryResult>,
}

impl CrawlResult {
    pub fn total_products(&self) -> usize {
        self.categories.iter().map(|c| c.products.len()).sum()
    }

    /// Looks up the result for a category by name
    pub fn category(&self, name: &str) -> Option<&CategoryResult> {
        self.categories.iter().find(|c| c.category == name)
    }
}
