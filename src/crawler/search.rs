//! Search crawler
//!
//! Drives a `SearchProvider` through successive results pages, keeping the
//! candidate links that carry the target extension and are new to both this
//! run and the persisted history. Stops once the collection is full, the
//! provider runs out of pages, the page budget is spent, or pagination leads
//! back to a page already read.

use crate::config::SearchConfig;
use crate::provider::SearchProvider;
use crate::state::{CrawlPhase, CrawlStop, LinkCollection};
use crate::storage::LinkHistory;
use crate::url::{has_extension, is_absolute_http};
use crate::HarvestError;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use thiserror::Error;

/// Successful end of a crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// New links, in the order they were found
    pub links: LinkCollection,

    /// Why the crawl stopped
    pub stop: CrawlStop,

    /// Number of results pages read
    pub pages: u32,
}

/// A crawl that failed part-way; the links gathered so far are kept
#[derive(Debug, Error)]
#[error("search aborted after {count} links: {error}", count = .collected.len())]
pub struct CrawlAbort {
    pub collected: LinkCollection,
    #[source]
    pub error: HarvestError,
}

/// Paginating link collector
#[derive(Debug, Clone)]
pub struct SearchCrawler {
    max_links: usize,
    max_pages: u32,
    extension: String,
    settle_delay: Duration,
}

impl SearchCrawler {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            max_links: config.max_links,
            max_pages: config.max_pages,
            extension: config.file_extension.clone(),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
        }
    }

    /// Overrides the delay observed after each page advance
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn max_links(&self) -> usize {
        self.max_links
    }

    /// Collects up to `max_links` new links for `query`
    ///
    /// The provider is borrowed, not closed: releasing the session is the
    /// caller's job on every exit path.
    ///
    /// # Arguments
    ///
    /// * `provider` - The search session to drive
    /// * `query` - Free-text query
    /// * `history` - Links collected by earlier runs; never collected again
    pub async fn crawl<P>(
        &self,
        provider: &mut P,
        query: &str,
        history: &LinkHistory,
    ) -> Result<CrawlReport, CrawlAbort>
    where
        P: SearchProvider + ?Sized,
    {
        let mut links = LinkCollection::new(self.max_links);
        let mut pages = 0u32;

        match self
            .drive(provider, query, history, &mut links, &mut pages)
            .await
        {
            Ok(stop) => Ok(CrawlReport { links, stop, pages }),
            Err(error) => Err(CrawlAbort {
                collected: links,
                error,
            }),
        }
    }

    async fn drive<P>(
        &self,
        provider: &mut P,
        query: &str,
        history: &LinkHistory,
        links: &mut LinkCollection,
        pages: &mut u32,
    ) -> Result<CrawlStop, HarvestError>
    where
        P: SearchProvider + ?Sized,
    {
        tracing::info!("Collecting up to {} {} links", self.max_links, self.extension);

        let mut phase = CrawlPhase::Searching;
        let mut ctx = provider.submit_query(query).await?;
        let mut visited: HashSet<Url> = HashSet::new();
        visited.insert(ctx.url.clone());
        phase = phase.transition(CrawlPhase::Extracting)?;

        loop {
            let candidates = provider.extract_candidate_links(&ctx).await?;
            *pages += 1;
            let added = self.collect(candidates, links, history);

            tracing::info!(
                "Found {} new {} links on page {}. Total: {}",
                added,
                self.extension,
                ctx.page_number,
                links.len()
            );

            if links.is_full() {
                phase.transition(CrawlPhase::Done(CrawlStop::LimitReached))?;
                tracing::info!("Reached the limit of {} links", self.max_links);
                return Ok(CrawlStop::LimitReached);
            }

            phase = phase.transition(CrawlPhase::AdvancingPage)?;

            if *pages >= self.max_pages {
                phase.transition(CrawlPhase::Done(CrawlStop::Exhausted))?;
                tracing::info!("Read the maximum of {} results pages", self.max_pages);
                return Ok(CrawlStop::Exhausted);
            }

            let Some(next) = provider.advance_page(&ctx).await? else {
                phase.transition(CrawlPhase::Done(CrawlStop::Exhausted))?;
                tracing::info!("No more search pages available");
                return Ok(CrawlStop::Exhausted);
            };

            if !visited.insert(next.url.clone()) {
                phase.transition(CrawlPhase::Done(CrawlStop::Exhausted))?;
                tracing::warn!("Pagination returned to {}, stopping", next.url);
                return Ok(CrawlStop::Exhausted);
            }

            tokio::time::sleep(self.settle_delay).await;
            ctx = next;
            phase = phase.transition(CrawlPhase::Extracting)?;
        }
    }

    /// Appends the acceptable candidates to `links`, returning how many were added
    ///
    /// A candidate is accepted if it is an absolute http(s) URL ending in the
    /// target extension, absent from `history`, and not yet collected. Appending
    /// stops as soon as the collection is full.
    pub fn collect(
        &self,
        candidates: Vec<String>,
        links: &mut LinkCollection,
        history: &LinkHistory,
    ) -> usize {
        let mut added = 0;
        for candidate in candidates {
            if links.is_full() {
                break;
            }
            if !has_extension(&candidate, &self.extension) || !is_absolute_http(&candidate) {
                continue;
            }
            if history.contains(&candidate) {
                tracing::debug!("Skipping previously collected link: {}", candidate);
                continue;
            }
            if links.push(candidate) {
                added += 1;
            }
        }
        added
    }
}
