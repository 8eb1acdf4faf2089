//! Content policy applied to the raw text of a document

/// Returns the first forbidden term found anywhere in `raw`, ignoring case
///
/// The whole text is searched, including notes and free-text regions that lie
/// outside any recognized column.
pub fn find_forbidden_term<'a>(raw: &str, terms: &'a [String]) -> Option<&'a str> {
    let haystack = raw.to_lowercase();
    terms
        .iter()
        .find(|term| haystack.contains(&term.to_lowercase()))
        .map(|term| term.as_str())
}
