//! CSV cleaning pipeline
//!
//! This module turns the raw text of a fetched document into either a cleaned
//! CSV or a skip decision. The stages run in order and each may short-circuit:
//!
//! 1. Content policy over the full raw text
//! 2. Header-driven parse (malformed rows dropped)
//! 3. Column classification by keyword
//! 4. Row cleaning and phone validation
//! 5. Empty-result check
//! 6. Serialization with the classified header

mod clean;
mod columns;
mod document;
mod phone;
mod policy;

pub use clean::clean_rows;
pub use columns::ColumnClassification;
pub use document::CsvDocument;
pub use phone::{clean_phone, is_valid_phone};
pub use policy::find_forbidden_term;

use crate::config::PipelineConfig;
use std::fmt;

/// Why a document was not written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The raw text contains a forbidden term
    PolicyExcluded { term: String },

    /// No header column matched the keyword set
    NoRelevantColumns,

    /// Columns matched, but none of them is phone-bearing
    NoPhoneColumn,

    /// No row kept a valid phone number after cleaning
    NoValidRows,

    /// The document could not be parsed or serialized
    ParseFailed(String),

    /// The document could not be downloaded
    FetchFailed(String),

    /// The cleaned document could not be stored
    WriteFailed(String),
}

impl SkipReason {
    /// Stable reason code, used in logs and statistics
    pub fn code(&self) -> &'static str {
        match self {
            Self::PolicyExcluded { .. } => "policy-excluded",
            Self::NoRelevantColumns => "no-relevant-columns",
            Self::NoPhoneColumn => "no-phone-column",
            Self::NoValidRows => "no-valid-rows",
            Self::ParseFailed(_) => "parse-failed",
            Self::FetchFailed(_) => "fetch-failed",
            Self::WriteFailed(_) => "write-failed",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PolicyExcluded { term } => write!(f, "{} (mentions '{}')", self.code(), term),
            Self::ParseFailed(detail) | Self::FetchFailed(detail) | Self::WriteFailed(detail) => {
                write!(f, "{}: {}", self.code(), detail)
            }
            _ => write!(f, "{}", self.code()),
        }
    }
}

/// A cleaned document ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedCsv {
    /// Retained columns, in original header order
    pub columns: Vec<String>,

    /// Number of rows kept
    pub rows: usize,

    /// Serialized CSV text, header first
    pub content: String,
}

/// Result of running the pipeline over one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Cleaned(CleanedCsv),
    Skipped(SkipReason),
}

impl PipelineOutcome {
    pub fn is_cleaned(&self) -> bool {
        matches!(self, Self::Cleaned(_))
    }
}

/// Runs every pipeline stage over `raw`
///
/// Never fails: parse problems become `Skipped(ParseFailed)` so a bad document
/// cannot abort a batch.
///
/// # Example
///
/// ```
/// use csv_harvest::config::PipelineConfig;
/// use csv_harvest::pipeline::{process_csv, PipelineOutcome};
///
/// let raw = "Name,Phone,Zip\nJane Doe,(555) 123-4567,90210\nBob,555-12,\n";
/// match process_csv(raw, &PipelineConfig::default()) {
///     PipelineOutcome::Cleaned(csv) => {
///         assert_eq!(csv.content, "Name,Phone,Zip\nJane Doe,5551234567,90210\n");
///     }
///     PipelineOutcome::Skipped(reason) => panic!("skipped: {}", reason),
/// }
/// ```
pub fn process_csv(raw: &str, config: &PipelineConfig) -> PipelineOutcome {
    if let Some(term) = find_forbidden_term(raw, &config.forbidden_terms) {
        return PipelineOutcome::Skipped(SkipReason::PolicyExcluded {
            term: term.to_string(),
        });
    }

    let doc = match CsvDocument::parse(raw) {
        Ok(doc) => doc,
        Err(e) => return PipelineOutcome::Skipped(SkipReason::ParseFailed(e.to_string())),
    };

    let classification = ColumnClassification::classify(doc.header(), config);
    if classification.selected.is_empty() {
        return PipelineOutcome::Skipped(SkipReason::NoRelevantColumns);
    }
    if classification.phone.is_empty() {
        return PipelineOutcome::Skipped(SkipReason::NoPhoneColumn);
    }

    let cleaned = clean_rows(&doc, &classification, config);
    if cleaned.row_count() == 0 {
        return PipelineOutcome::Skipped(SkipReason::NoValidRows);
    }

    match cleaned.to_csv_string() {
        Ok(content) => PipelineOutcome::Cleaned(CleanedCsv {
            columns: cleaned.header().to_vec(),
            rows: cleaned.row_count(),
            content,
        }),
        Err(e) => PipelineOutcome::Skipped(SkipReason::ParseFailed(e.to_string())),
    }
}
