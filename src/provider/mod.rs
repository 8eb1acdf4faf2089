//! Search provider capability
//!
//! The crawler drives a search session through three operations: submit a
//! query, read candidate links from the current results page, and advance to
//! the next page. Anything session-specific (consent screens, rendering,
//! cookies) stays behind this trait.

mod html;
mod parser;

pub use html::HtmlSearchProvider;
pub use parser::{parse_results_page, ResultsPage};

use crate::Result;
use async_trait::async_trait;
use url::Url;

/// One loaded results page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsContext {
    /// Address the page was loaded from
    pub url: Url,

    /// 1-based page number within the current query
    pub page_number: u32,

    /// Raw page content
    pub body: String,
}

/// A paginated search session
///
/// A provider is used by one crawl at a time. `close` releases the session and
/// must be safe to call more than once.
#[async_trait]
pub trait SearchProvider: Send {
    /// Submits `query` and returns the first results page
    async fn submit_query(&mut self, query: &str) -> Result<ResultsContext>;

    /// Returns every link on the page, in page order
    async fn extract_candidate_links(&mut self, ctx: &ResultsContext) -> Result<Vec<String>>;

    /// Loads the page after `ctx`, or `None` when there are no more pages
    async fn advance_page(&mut self, ctx: &ResultsContext) -> Result<Option<ResultsContext>>;

    /// Releases the underlying session
    async fn close(&mut self) -> Result<()>;
}
