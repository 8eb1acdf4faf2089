//! Crawler module for link collection and document retrieval
//!
//! This module contains the core harvesting logic, including:
//! - Paginated link collection against a search provider
//! - HTTP fetching of collected links
//! - Overall run coordination

mod coordinator;
mod fetcher;
mod search;

pub use coordinator::{clean_directory, Coordinator, DocumentSink, LinkOutcome};
pub use fetcher::{build_http_client, CsvFetcher, FetchResult};
pub use search::{CrawlAbort, CrawlReport, SearchCrawler};

use crate::config::Config;
use crate::output::HarvestStatistics;
use crate::provider::HtmlSearchProvider;
use crate::storage::open_history;
use crate::Result;
use std::path::Path;

/// Runs a complete harvest for `query`
///
/// This is the main entry point for a harvest. It will:
/// 1. Build the HTTP client and open the search session
/// 2. Collect new links, skipping the persisted history
/// 3. Fetch, clean and store each collected document
/// 4. Persist the collected links and release the session
/// 5. Invoke the formatter over the storage directory
///
/// Initialization failures return before any file is touched.
///
/// # Arguments
///
/// * `config` - The run configuration
/// * `query` - Free-text search query
///
/// # Returns
///
/// * `Ok(HarvestStatistics)` - Harvest completed
/// * `Err(HarvestError)` - Initialization, search or persistence failed
pub async fn run_harvest(config: Config, query: &str) -> Result<HarvestStatistics> {
    let client = build_http_client(&config.fetch)?;
    let provider = HtmlSearchProvider::new(client.clone(), &config.search)?;
    let history = open_history(Path::new(&config.storage.links_file));

    let mut coordinator = Coordinator::new(config, provider, history, CsvFetcher::new(client));
    coordinator.run(query).await
}
