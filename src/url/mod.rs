//! URL handling module for CSV-Harvest
//!
//! This module provides candidate-link matching and the derivation of storage
//! file names from download URLs.

mod filename;

pub use filename::{file_name_for, fallback_file_name};

/// Returns true if `link` ends with `extension`, ignoring ASCII case
///
/// # Examples
///
/// ```
/// use csv_harvest::url::has_extension;
///
/// assert!(has_extension("https://data.example.gov/contacts.csv", ".csv"));
/// assert!(has_extension("https://data.example.gov/CONTACTS.CSV", ".csv"));
/// assert!(!has_extension("https://data.example.gov/contacts.csv?download=1", ".csv"));
/// ```
pub fn has_extension(link: &str, extension: &str) -> bool {
    link.len() >= extension.len()
        && link.is_char_boundary(link.len() - extension.len())
        && link[link.len() - extension.len()..].eq_ignore_ascii_case(extension)
}

/// Returns true if the link is an absolute http(s) URL
pub fn is_absolute_http(link: &str) -> bool {
    match ::url::Url::parse(link) {
        Ok(url) => url.scheme() == "http" || url.scheme() == "https",
        Err(_) => false,
    }
}
