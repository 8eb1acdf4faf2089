//! Newline-delimited link history
//!
//! This module provides a file-based implementation of the HistoryStore trait.

use crate::storage::traits::{HistoryStore, StorageResult};
use std::collections::HashSet;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Links collected in prior runs
///
/// Membership is exact string equality; file order is kept for rewriting.
#[derive(Debug, Clone, Default)]
pub struct LinkHistory {
    links: Vec<String>,
    index: HashSet<String>,
}

impl LinkHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a history from newline-delimited text, ignoring blank lines and repeats
    pub fn from_text(text: &str) -> Self {
        let mut history = Self::new();
        for line in text.lines() {
            history.insert(line.trim());
        }
        history
    }

    /// Adds a link, returning false if it was already known
    pub fn insert(&mut self, link: &str) -> bool {
        if link.is_empty() || self.index.contains(link) {
            return false;
        }
        self.index.insert(link.to_string());
        self.links.push(link.to_string());
        true
    }

    pub fn contains(&self, link: &str) -> bool {
        self.index.contains(link)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.links.iter()
    }
}

/// File-backed link history
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_existing(&self) -> StorageResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> StorageResult<LinkHistory> {
        match self.read_existing()? {
            Some(text) => {
                let history = LinkHistory::from_text(&text);
                tracing::info!(
                    "Loaded {} existing links from {}",
                    history.len(),
                    self.path.display()
                );
                Ok(history)
            }
            None => {
                tracing::warn!(
                    "No existing links file found at {}. Starting fresh.",
                    self.path.display()
                );
                Ok(LinkHistory::new())
            }
        }
    }

    fn persist(&mut self, new_links: &[String], prior: &LinkHistory) -> StorageResult<()> {
        let mut merged = LinkHistory::new();
        for link in new_links {
            merged.insert(link.trim());
        }
        for link in prior.iter() {
            merged.insert(link);
        }

        // Entries written to the file since it was loaded are kept too
        if let Some(current) = self.read_existing()? {
            for line in current.lines() {
                merged.insert(line.trim());
            }
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Write beside the target then rename, so a failed write leaves the old file intact
        let tmp_path = self.path.with_extension("tmp");
        {
            let mut file = std::fs::File::create(&tmp_path)?;
            for link in merged.iter() {
                writeln!(file, "{}", link)?;
            }
            file.sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;

        tracing::info!(
            "Saved {} new links to {} ({} total)",
            new_links.len(),
            self.path.display(),
            merged.len()
        );

        Ok(())
    }
}
