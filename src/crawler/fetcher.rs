//! HTTP fetcher for CSV documents
//!
//! This module handles all document downloads, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests for a single link
//! - Error classification into per-link outcomes
//!
//! A fetch never returns `Err`: every failure is a `FetchResult` variant so one
//! bad link cannot abort the batch.

use crate::config::FetchConfig;
use reqwest::Client;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully downloaded the document
    Success {
        /// Final URL after redirects
        final_url: String,
        /// Content-Type header value
        content_type: String,
        /// Document body
        body: String,
    },

    /// The server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body decode, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// One-line description of a failed fetch
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::HttpError { status_code } => Some(format!("HTTP {}", status_code)),
            Self::NetworkError { error } => Some(error.clone()),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use csv_harvest::config::FetchConfig;
/// use csv_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Downloads single CSV documents
#[derive(Debug, Clone)]
pub struct CsvFetcher {
    client: Client,
}

impl CsvFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches `url`, classifying every failure
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx | Success |
    /// | Any other status | HttpError |
    /// | Timeout | NetworkError ("Request timeout") |
    /// | Connection failure | NetworkError ("Connection refused") |
    /// | Body not readable | NetworkError |
    pub async fn fetch(&self, url: &str) -> FetchResult {
        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                let final_url = response.url().to_string();

                if !status.is_success() {
                    return FetchResult::HttpError {
                        status_code: status.as_u16(),
                    };
                }

                let content_type = response
                    .headers()
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();

                match response.text().await {
                    Ok(body) => FetchResult::Success {
                        final_url,
                        content_type,
                        body,
                    },
                    Err(e) => FetchResult::NetworkError {
                        error: e.to_string(),
                    },
                }
            }
            Err(e) => {
                if e.is_timeout() {
                    FetchResult::NetworkError {
                        error: "Request timeout".to_string(),
                    }
                } else if e.is_connect() {
                    FetchResult::NetworkError {
                        error: "Connection refused".to_string(),
                    }
                } else {
                    FetchResult::NetworkError {
                        error: e.to_string(),
                    }
                }
            }
        }
    }
}
