//! Catalog data model
//!
//! Records produced by the crawl pipeline, from a single decoded product page up
//! to the full multi-category result.
//!
//! # Components
//!
//! - `ProductSource`: decoded state of one product page
//! - `VariantRecord`: one resolved (or unresolved) color x size combination
//! - `ProductRecord`: a product together with its category, store and variants
//! - `CategoryResult` / `CrawlResult`: ordered collections of the above

mod product;
mod variant;

pub use product::{CategoryResult, CategoryStats, CrawlResult, ProductRecord, ProductSource};
pub use variant::{SwatchOption, VariantRecord};
pub(crate) use variant::id_to_string;

/// Format used for capture timestamps in the output document
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
