//! Storage traits and error types
//!
//! This module defines the trait interface for link history backends and
//! associated error types.

use crate::storage::LinkHistory;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for link history backends
///
/// The history has set semantics: a link is either known or not. Backends keep
/// the order links were recorded in so the persisted form stays stable.
pub trait HistoryStore {
    /// Loads every previously collected link
    ///
    /// A missing backing store is the expected first-run condition and yields an
    /// empty history rather than an error.
    fn load(&self) -> StorageResult<LinkHistory>;

    /// Records `new_links` ahead of `prior`
    ///
    /// Implementations must never drop a link that is already recorded.
    ///
    /// # Arguments
    ///
    /// * `new_links` - Links collected in this run, in collection order
    /// * `prior` - The history loaded at the start of the run
    fn persist(&mut self, new_links: &[String], prior: &LinkHistory) -> StorageResult<()>;
}
