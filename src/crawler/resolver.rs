//! Variant resolution
//!
//! Every color x size combination of a product is looked up with one
//! form-encoded POST. Lookups for one product run concurrently (bounded by
//! `max-concurrent-variants`) and come back in combination order: colors in
//! the outer loop, sizes in the inner loop.
//!
//! A lookup that produces no usable data still yields a `VariantRecord`, with
//! `variant_id` and `response` left empty.

use crate::catalog::{ProductSource, SwatchOption, VariantRecord};
use crate::config::SiteConfig;
use crate::crawler::fetcher::{FetchOutcome, Transport};
use crate::crawler::scheduler::run_ordered;
use serde_json::Value;
use url::form_urlencoded;

/// Builds the form body for one lookup call
///
/// Attribute ids and option ids are passed through untouched:
/// `sku=ABC&options%5B277%5D=10&options%5B617%5D=20`.
pub fn lookup_payload(
    sku: &str,
    color: &SwatchOption,
    size: &SwatchOption,
    site: &SiteConfig,
) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("sku", sku)
        .append_pair(&format!("options[{}]", site.color_attribute_id), &color.id)
        .append_pair(&format!("options[{}]", site.size_attribute_id), &size.id)
        .finish()
}

/// Enumerates color x size pairs, color-major
pub fn combinations(source: &ProductSource) -> Vec<(&SwatchOption, &SwatchOption)> {
    source
        .colors
        .iter()
        .flat_map(|color| source.sizes.iter().map(move |size| (color, size)))
        .collect()
}

/// Resolves the variants of a product through the lookup endpoint
pub struct VariantResolver<'a> {
    transport: &'a Transport,
    site: &'a SiteConfig,
    max_concurrent: usize,
}

impl<'a> VariantResolver<'a> {
    pub fn new(transport: &'a Transport, site: &'a SiteConfig, max_concurrent: usize) -> Self {
        Self {
            transport,
            site,
            max_concurrent,
        }
    }

    /// Issues one lookup per combination and returns one record per combination
    ///
    /// # Arguments
    ///
    /// * `source` - The decoded product
    ///
    /// # Returns
    ///
    /// `colors.len() * sizes.len()` records, in combination order
    pub async fn resolve(&self, source: &ProductSource) -> Vec<VariantRecord> {
        let pairs = combinations(source);
        if pairs.is_empty() {
            tracing::debug!(
                "No combinations to resolve ({} colors, {} sizes)",
                source.colors.len(),
                source.sizes.len()
            );
            return Vec::new();
        }

        let sku = match source.sku.as_deref() {
            Some(sku) => sku,
            None => {
                tracing::warn!(
                    "Product {:?} has no SKU; looking up {} variants with an empty sku",
                    source.product_id,
                    pairs.len()
                );
                ""
            }
        };

        let this = self;
        let records = run_ordered(pairs, self.max_concurrent, move |_, (color, size)| {
            this.lookup(sku, color, size)
        })
        .await;

        let unresolved = records.iter().filter(|r| !r.is_resolved()).count();
        if unresolved > 0 {
            tracing::warn!(
                "{} of {} variant lookups failed for product {:?}",
                unresolved,
                records.len(),
                source.product_id
            );
        }

        records
    }

    async fn lookup(&self, sku: &str, color: &SwatchOption, size: &SwatchOption) -> VariantRecord {
        let payload = lookup_payload(sku, color, size, self.site);
        let outcome = self
            .transport
            .post_form(&self.site.lookup_url, payload.clone())
            .await;

        let body = match outcome {
            FetchOutcome::Success { body, .. } => body,
            other => {
                tracing::warn!("Variant lookup failed ({}) for payload: {}", other, payload);
                return VariantRecord::unresolved(color, size);
            }
        };

        match serde_json::from_str::<Value>(&body) {
            Ok(response) if has_content(&response) => VariantRecord::resolved(color, size, response),
            Ok(_) => {
                tracing::warn!("Variant lookup returned no data for payload: {}", payload);
                VariantRecord::unresolved(color, size)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to decode variant lookup response for payload {}: {}",
                    payload,
                    e
                );
                VariantRecord::unresolved(color, size)
            }
        }
    }
}

/// `null`, `{}` and `[]` carry nothing worth recording
fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}
