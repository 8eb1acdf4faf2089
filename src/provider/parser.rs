//! HTML parser for search results pages
//!
//! This module extracts from a results page:
//! - Result links (absolute URLs, redirect wrappers unwrapped)
//! - The link to the next results page, if any

use scraper::{Html, Selector};
use url::Url;

/// Query parameters search engines use to wrap outbound result links
const REDIRECT_PARAMS: &[&str] = &["q", "url", "uddg"];

/// Extracted information from a results page
#[derive(Debug, Clone, Default)]
pub struct ResultsPage {
    /// All links found on the page (absolute URLs)
    pub links: Vec<String>,

    /// Absolute URL of the next results page
    pub next: Option<String>,
}

/// Parses a results page
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
/// - Non-HTTP(S) URLs after resolution
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The page URL, for resolving relative links
/// * `next_selector` - Selector matching the "next page" link
///
/// # Example
///
/// ```
/// use csv_harvest::provider::parse_results_page;
/// use scraper::Selector;
/// use url::Url;
///
/// let html = r#"<a href="/files/a.csv">A</a><a id="pnnext" href="/search?page=2">Next</a>"#;
/// let base = Url::parse("https://search.example.com/search?q=x").unwrap();
/// let next = Selector::parse("a#pnnext").unwrap();
/// let page = parse_results_page(html, &base, &next);
/// assert_eq!(page.links[0], "https://search.example.com/files/a.csv");
/// assert_eq!(page.next.as_deref(), Some("https://search.example.com/search?page=2"));
/// ```
pub fn parse_results_page(html: &str, base_url: &Url, next_selector: &Selector) -> ResultsPage {
    let document = Html::parse_document(html);

    let links = extract_links(&document, base_url);

    let next = document
        .select(next_selector)
        .filter_map(|element| element.value().attr("href"))
        .find_map(|href| resolve_link(href, base_url));

    ResultsPage { links, next }
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(unwrap_redirect(&absolute_url));
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

/// Returns the wrapped target of a search-engine redirect link, or the link itself
fn unwrap_redirect(link: &str) -> String {
    let Ok(url) = Url::parse(link) else {
        return link.to_string();
    };

    let path = url.path();
    if path != "/url" && path != "/l/" {
        return link.to_string();
    }

    url.query_pairs()
        .find(|(key, value)| {
            REDIRECT_PARAMS.contains(&key.as_ref())
                && (value.starts_with("http://") || value.starts_with("https://"))
        })
        .map(|(_, value)| value.into_owned())
        .unwrap_or_else(|| link.to_string())
}
