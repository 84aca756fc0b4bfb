//! Embedded-data extraction for product pages
//!
//! A product page carries two JSON payloads inside script blocks:
//! - a structured-schema block (SKU, name, offers, ...)
//! - a page-init block holding the swatch renderer configuration, which lists
//!   color and size options, the price table, and images
//!
//! The schema is optional; the swatch configuration is not. Candidate page-init
//! blocks are tried in document order and the first one that decodes and
//! actually contains a non-empty swatch configuration wins.

use crate::catalog::{id_to_string, ProductSource, SwatchOption};
use crate::config::SiteConfig;
use crate::crawler::parser::ProductPage;
use serde_json::{Map, Value};
use thiserror::Error;

/// Key of the swatch component inside a page-init block
const SWATCH_COMPONENT_KEY: &str = "[data-role=swatch-options]";

/// Key of the renderer settings inside the swatch component
const SWATCH_RENDERER_KEY: &str = "Magento_Swatches/js/swatch-renderer";

/// Reasons a product page yields no `ProductSource`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no swatch configuration among {candidates} page-init block(s)")]
    MissingConfiguration { candidates: usize },

    #[error("swatch configuration block is not valid JSON: {0}")]
    Decode(String),

    #[error("swatch configuration is empty")]
    EmptyConfiguration,
}

/// Extracts a `ProductSource` from the script blocks of a product page
///
/// # Arguments
///
/// * `page` - Script blocks collected from the product page
/// * `site` - Site configuration (swatch marker and attribute ids)
///
/// # Returns
///
/// * `Ok(ProductSource)` - Swatch configuration found and decoded
/// * `Err(ExtractError)` - The product has to be skipped
pub fn extract_product(page: &ProductPage, site: &SiteConfig) -> Result<ProductSource, ExtractError> {
    let schema = decode_schema(page.schema_block.as_deref());
    let sku = schema.get("sku").and_then(id_to_string);

    let config = find_swatch_config(&page.init_blocks, &site.swatch_marker)?;

    Ok(ProductSource {
        sku,
        product_id: config.get("productId").and_then(parse_product_id),
        images: config
            .get("images")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())),
        schema,
        prices: config
            .get("optionPrices")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
        colors: attribute_options(&config, &site.color_attribute_id),
        sizes: attribute_options(&config, &site.size_attribute_id),
    })
}

/// Decodes the structured-schema block, degrading to an empty object
fn decode_schema(block: Option<&str>) -> Value {
    let Some(text) = block else {
        tracing::debug!("Product page has no structured-schema block");
        return Value::Object(Map::new());
    };

    match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Malformed structured-schema block, using empty schema: {}", e);
            Value::Object(Map::new())
        }
    }
}

/// Scans page-init blocks for the first valid swatch configuration
fn find_swatch_config(blocks: &[String], marker: &str) -> Result<Map<String, Value>, ExtractError> {
    let mut candidates = 0;
    let mut decode_error = None;
    let mut saw_empty = false;

    for block in blocks.iter().filter(|b| b.contains(marker)) {
        candidates += 1;

        let value: Value = match serde_json::from_str(block.trim()) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Skipping undecodable page-init block: {}", e);
                decode_error = Some(e.to_string());
                continue;
            }
        };

        match locate_swatch_config(&value) {
            Some(config) if !config.is_empty() => return Ok(config.clone()),
            Some(_) => saw_empty = true,
            None => {}
        }
    }

    if saw_empty {
        Err(ExtractError::EmptyConfiguration)
    } else if let Some(error) = decode_error {
        Err(ExtractError::Decode(error))
    } else {
        Err(ExtractError::MissingConfiguration { candidates })
    }
}

fn locate_swatch_config(value: &Value) -> Option<&Map<String, Value>> {
    value
        .get(SWATCH_COMPONENT_KEY)?
        .get(SWATCH_RENDERER_KEY)?
        .get("jsonConfig")?
        .as_object()
}

/// Accepts the product id as a JSON number or a numeric string
fn parse_product_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reads the option list of one swatch attribute
///
/// A missing attribute yields an empty list. Options without an id are
/// dropped since they cannot be looked up.
fn attribute_options(config: &Map<String, Value>, attribute_id: &str) -> Vec<SwatchOption> {
    let Some(options) = config
        .get("attributes")
        .and_then(|attributes| attributes.get(attribute_id))
        .and_then(|attribute| attribute.get("options"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    options
        .iter()
        .filter_map(|option| {
            let Some(id) = option.get("id").and_then(id_to_string) else {
                tracing::debug!("Dropping option without id for attribute {}", attribute_id);
                return None;
            };
            let label = option
                .get("label")
                .and_then(Value::as_str)
                .unwrap_or_default();
            Some(SwatchOption::new(id, label))
        })
        .collect()
}
