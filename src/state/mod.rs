//! State module for tracking a collection run
//!
//! # Components
//!
//! - `CrawlPhase`: the search crawler's state machine
//! - `LinkCollection`: the bounded, duplicate-free links gathered during one run

mod collection;
mod crawl_phase;

// Re-export main types
pub use collection::LinkCollection;
pub use crawl_phase::{CrawlPhase, CrawlStop};
