//! CSV-Harvest: a search-driven CSV contact collector
//!
//! This crate discovers downloadable CSV resources through a paginated search,
//! deduplicates them against a persisted link history, and writes cleaned,
//! contact-scoped copies of the documents that pass content policy.

pub mod config;
pub mod crawler;
pub mod output;
pub mod pipeline;
pub mod provider;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for CSV-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Search provider error: {0}")]
    Provider(String),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("Search aborted with {} links collected but not downloaded: {source}", .undownloaded.len())]
    SearchAborted {
        undownloaded: Vec<String>,
        source: Box<HarvestError>,
    },

    #[error("External process {program} failed: {message}")]
    Collaborator { program: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for CSV-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use pipeline::{process_csv, PipelineOutcome, SkipReason};
pub use state::{CrawlPhase, LinkCollection};
