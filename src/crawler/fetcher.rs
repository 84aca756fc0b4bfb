//! HTTP transport for the crawler
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with the configured user agent and timeouts
//! - Injecting the fixed page and lookup headers supplied by configuration
//! - GET requests for listing and product pages
//! - Form-encoded POST requests for variant lookups
//! - Classifying every outcome so failures can be logged precisely

use crate::config::{ClientConfig, HeaderConfig};
use crate::ConfigError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// Result of a single GET or POST
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Success status with a non-empty body
    Success {
        /// HTTP status code
        status_code: u16,
        /// Response body
        body: String,
    },

    /// Success status but nothing in the body
    Empty {
        /// HTTP status code
        status_code: u16,
    },

    /// Non-success HTTP status
    HttpError {
        /// HTTP status code
        status_code: u16,
    },

    /// Connection, timeout, or body read failure
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchOutcome {
    /// Returns the body if the request produced usable data
    ///
    /// Every other outcome collapses to `None`; callers that need to tell
    /// them apart should log `self` before converting.
    pub fn into_body(self) -> Option<String> {
        match self {
            Self::Success { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns true if the request produced usable data
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { status_code, body } => {
                write!(f, "HTTP {} ({} bytes)", status_code, body.len())
            }
            Self::Empty { status_code } => write!(f, "HTTP {} with empty body", status_code),
            Self::HttpError { status_code } => write!(f, "HTTP {}", status_code),
            Self::NetworkError { error } => write!(f, "network error: {}", error),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The client configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ClientConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Converts a configured header table into a `HeaderMap`
pub fn build_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ConfigError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ConfigError::InvalidHeader(format!("'{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ConfigError::InvalidHeader(format!("value of '{}': {}", name, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Shared transport used by every concurrent task of a crawl
///
/// The underlying `Client` owns the connection pool; the transport itself is
/// only ever borrowed immutably.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    page_headers: HeaderMap,
    lookup_headers: HeaderMap,
}

impl Transport {
    /// Creates a transport from an existing client and configured headers
    pub fn new(client: Client, headers: &HeaderConfig) -> Result<Self, ConfigError> {
        let page_headers = build_header_map(&headers.page)?;
        let mut lookup_headers = build_header_map(&headers.lookup)?;
        if !lookup_headers.contains_key(CONTENT_TYPE) {
            lookup_headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        }

        Ok(Self {
            client,
            page_headers,
            lookup_headers,
        })
    }

    /// Fetches a page with the configured page headers
    pub async fn get(&self, url: &str) -> FetchOutcome {
        let request = self.client.get(url).headers(self.page_headers.clone());
        classify(request.send().await).await
    }

    /// Posts a form-encoded body with the configured lookup headers
    pub async fn post_form(&self, url: &str, form_body: String) -> FetchOutcome {
        let request = self
            .client
            .post(url)
            .headers(self.lookup_headers.clone())
            .body(form_body);
        classify(request.send().await).await
    }
}

async fn classify(result: Result<reqwest::Response, reqwest::Error>) -> FetchOutcome {
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection refused".to_string()
            } else {
                e.to_string()
            };
            return FetchOutcome::NetworkError { error };
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchOutcome::HttpError {
            status_code: status.as_u16(),
        };
    }

    match response.text().await {
        Ok(body) if body.trim().is_empty() => FetchOutcome::Empty {
            status_code: status.as_u16(),
        },
        Ok(body) => FetchOutcome::Success {
            status_code: status.as_u16(),
            body,
        },
        Err(e) => FetchOutcome::NetworkError {
            error: e.to_string(),
        },
    }
}
