//! Bounded, append-only collection of links gathered during one run

use std::collections::HashSet;

/// Ordered links collected in a single run
///
/// Appends are rejected once the collection holds `max_size` links or when the
/// link is already present, so the collection never exceeds its bound and never
/// holds duplicates.
#[derive(Debug, Clone)]
pub struct LinkCollection {
    links: Vec<String>,
    seen: HashSet<String>,
    max_size: usize,
}

impl LinkCollection {
    /// Creates an empty collection bounded by `max_size`
    pub fn new(max_size: usize) -> Self {
        Self {
            links: Vec::new(),
            seen: HashSet::new(),
            max_size,
        }
    }

    /// Appends a link, returning false if it is a duplicate or the collection is full
    pub fn push(&mut self, link: String) -> bool {
        if self.is_full() || self.seen.contains(&link) {
            return false;
        }

        self.seen.insert(link.clone());
        self.links.push(link);
        true
    }

    /// Returns true if the link was already collected in this run
    pub fn contains(&self, link: &str) -> bool {
        self.seen.contains(link)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Returns true once the configured maximum has been reached
    pub fn is_full(&self) -> bool {
        self.links.len() >= self.max_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Links in collection order
    pub fn as_slice(&self) -> &[String] {
        &self.links
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.links.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.links
    }
}
