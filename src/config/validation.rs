use crate::config::types::{ClientConfig, Config, HeaderConfig, OutputConfig, SiteConfig};
use crate::crawler::build_header_map;
use crate::ConfigError;
use scraper::Selector;
use std::collections::BTreeMap;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_store(&config.store)?;
    validate_categories(&config.categories)?;
    validate_site_config(&config.site)?;
    validate_client_config(&config.client)?;
    validate_header_config(&config.headers)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_store(store: &str) -> Result<(), ConfigError> {
    if store.trim().is_empty() {
        return Err(ConfigError::Validation("store cannot be empty".to_string()));
    }
    Ok(())
}

/// Validates category slugs
///
/// Slugs are spliced into the listing URL path, so they may not carry
/// path, query, or fragment delimiters.
fn validate_categories(categories: &[String]) -> Result<(), ConfigError> {
    if categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one category is required".to_string(),
        ));
    }

    for category in categories {
        validate_category(category)?;
    }

    Ok(())
}

/// Validates a single category slug
pub fn validate_category(category: &str) -> Result<(), ConfigError> {
    if category.trim().is_empty() {
        return Err(ConfigError::Validation(
            "category cannot be empty".to_string(),
        ));
    }

    if category.contains(['/', '?', '#']) {
        return Err(ConfigError::Validation(format!(
            "category '{}' cannot contain '/', '?' or '#'",
            category
        )));
    }

    Ok(())
}

/// Validates the storefront layout
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let listing = validate_http_url("listing-base-url", &config.listing_base_url)?;
    if !listing.path().ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "listing-base-url must end with '/', got '{}'",
            config.listing_base_url
        )));
    }

    validate_http_url("lookup-url", &config.lookup_url)?;

    if config.page_size < 1 {
        return Err(ConfigError::Validation(format!(
            "page-size must be >= 1, got {}",
            config.page_size
        )));
    }

    if config.color_attribute_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "color-attribute-id cannot be empty".to_string(),
        ));
    }

    if config.size_attribute_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "size-attribute-id cannot be empty".to_string(),
        ));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1 when set".to_string(),
        ));
    }

    for selector in [
        &config.product_link_selector,
        &config.page_init_selector,
        &config.schema_selector,
    ] {
        validate_selector(selector)?;
    }

    if config.swatch_marker.is_empty() {
        return Err(ConfigError::Validation(
            "swatch-marker cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP client settings
fn validate_client_config(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 || config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be >= 1s, got timeout-secs={} connect-timeout-secs={}",
            config.timeout_secs, config.connect_timeout_secs
        )));
    }

    for (name, value) in [
        ("max-concurrent-products", config.max_concurrent_products),
        ("max-concurrent-variants", config.max_concurrent_variants),
    ] {
        if !(1..=100).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and 100, got {}",
                name, value
            )));
        }
    }

    Ok(())
}

fn validate_header_config(config: &HeaderConfig) -> Result<(), ConfigError> {
    validate_headers(&config.page)?;
    validate_headers(&config.lookup)?;
    Ok(())
}

/// Checks that every header name and value is transmittable
fn validate_headers(headers: &BTreeMap<String, String>) -> Result<(), ConfigError> {
    build_header_map(headers).map(|_| ())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(url)
}

fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {}", selector, e)))
}
