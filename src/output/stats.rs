//! Run statistics
//!
//! Counts what happened to every collected link so the run can be summarized
//! at the end.

use crate::pipeline::SkipReason;
use crate::state::CrawlStop;
use std::collections::BTreeMap;

/// Statistics for one harvest run
#[derive(Debug, Clone, Default)]
pub struct HarvestStatistics {
    /// New links collected by the search phase
    pub links_collected: u64,

    /// Results pages read
    pub pages_visited: u32,

    /// Why the search phase stopped, if it ran
    pub crawl_stop: Option<CrawlStop>,

    /// Documents processed (fetched or read from disk)
    pub documents_processed: u64,

    /// Cleaned documents written
    pub documents_written: u64,

    /// Rows across all written documents
    pub rows_written: u64,

    /// Skipped documents per reason code
    pub skipped: BTreeMap<&'static str, u64>,
}

impl HarvestStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a document that was cleaned and written
    pub fn record_written(&mut self, rows: usize) {
        self.documents_processed += 1;
        self.documents_written += 1;
        self.rows_written += rows as u64;
    }

    /// Records a document that was skipped
    pub fn record_skipped(&mut self, reason: &SkipReason) {
        self.documents_processed += 1;
        *self.skipped.entry(reason.code()).or_insert(0) += 1;
    }

    pub fn total_skipped(&self) -> u64 {
        self.skipped.values().sum()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Search:");
    println!("  New links collected: {}", stats.links_collected);
    println!("  Results pages read: {}", stats.pages_visited);
    match stats.crawl_stop {
        Some(CrawlStop::LimitReached) => println!("  Stopped: link limit reached"),
        Some(CrawlStop::Exhausted) => println!("  Stopped: no more results pages"),
        None => {}
    }
    println!();

    println!("Documents:");
    println!("  Processed: {}", stats.documents_processed);
    println!("  Written: {}", stats.documents_written);
    println!("  Rows written: {}", stats.rows_written);
    println!();

    if !stats.skipped.is_empty() {
        println!("Skipped by Reason:");
        let mut counts: Vec<_> = stats.skipped.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1));

        for (reason, count) in counts {
            println!("  {}: {}", reason, count);
        }
        println!();
    }

    let yield_rate = if stats.documents_processed > 0 {
        (stats.documents_written as f64 / stats.documents_processed as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Yield: {:.1}% ({} / {} documents written)",
        yield_rate, stats.documents_written, stats.documents_processed
    );
}
