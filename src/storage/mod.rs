//! Storage module for persisting run data
//!
//! This module handles all filesystem state owned by the harvester:
//! - The newline-delimited history of previously collected links
//! - The directory receiving one cleaned CSV per document

mod csv_dir;
mod history;
mod traits;

pub use csv_dir::CsvDirectory;
pub use history::{FileHistoryStore, LinkHistory};
pub use traits::{HistoryStore, StorageError, StorageResult};

use std::path::Path;

/// Opens the link history stored at `path`
///
/// # Arguments
///
/// * `path` - Path to the newline-delimited links file
///
/// # Returns
///
/// A file-backed history store; the file itself is only touched on load/persist
pub fn open_history(path: &Path) -> FileHistoryStore {
    FileHistoryStore::new(path)
}
