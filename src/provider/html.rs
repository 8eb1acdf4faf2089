//! HTTP search provider
//!
//! Loads results pages from a search endpoint over plain HTTP and follows the
//! page's "next" link to paginate.

use crate::config::SearchConfig;
use crate::provider::parser::parse_results_page;
use crate::provider::{ResultsContext, SearchProvider};
use crate::{HarvestError, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::Selector;
use std::time::Duration;
use url::Url;

/// Search provider backed by an HTML search endpoint
pub struct HtmlSearchProvider {
    client: Client,
    endpoint: String,
    next_selector: Selector,
    page_timeout: Duration,
    closed: bool,
}

impl HtmlSearchProvider {
    /// Creates a provider for the configured endpoint
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for every results page
    /// * `config` - Endpoint template, next-page selector and page timeout
    pub fn new(client: Client, config: &SearchConfig) -> Result<Self> {
        let next_selector = Selector::parse(&config.next_selector).map_err(|e| {
            HarvestError::Provider(format!(
                "Invalid next-page selector '{}': {:?}",
                config.next_selector, e
            ))
        })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            next_selector,
            page_timeout: Duration::from_millis(config.page_timeout_ms),
            closed: false,
        })
    }

    /// Builds the first results URL for `query`
    pub fn query_url(&self, query: &str) -> Result<Url> {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        Ok(Url::parse(&self.endpoint.replace("{query}", &encoded))?)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(HarvestError::Provider(
                "search session already closed".to_string(),
            ));
        }
        Ok(())
    }

    async fn load_page(&self, url: Url, page_number: u32) -> Result<ResultsContext> {
        tracing::debug!("Loading results page {}: {}", page_number, url);

        let response = self
            .client
            .get(url.clone())
            .timeout(self.page_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Provider(format!(
                "results page {} returned HTTP {}",
                url,
                status.as_u16()
            )));
        }

        let final_url = response.url().clone();
        let body = response.text().await?;

        Ok(ResultsContext {
            url: final_url,
            page_number,
            body,
        })
    }
}

#[async_trait]
impl SearchProvider for HtmlSearchProvider {
    async fn submit_query(&mut self, query: &str) -> Result<ResultsContext> {
        self.ensure_open()?;
        let url = self.query_url(query)?;
        tracing::info!("Searching for: \"{}\"", query);
        self.load_page(url, 1).await
    }

    async fn extract_candidate_links(&mut self, ctx: &ResultsContext) -> Result<Vec<String>> {
        self.ensure_open()?;
        Ok(parse_results_page(&ctx.body, &ctx.url, &self.next_selector).links)
    }

    async fn advance_page(&mut self, ctx: &ResultsContext) -> Result<Option<ResultsContext>> {
        self.ensure_open()?;

        let next = parse_results_page(&ctx.body, &ctx.url, &self.next_selector).next;
        let Some(next) = next else {
            return Ok(None);
        };

        let next_url = Url::parse(&next)?;
        if next_url == ctx.url {
            tracing::warn!("Next-page link points back at {}, stopping", ctx.url);
            return Ok(None);
        }

        self.load_page(next_url, ctx.page_number + 1).await.map(Some)
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            tracing::debug!("Search session closed");
        }
        Ok(())
    }
}
