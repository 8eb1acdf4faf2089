//! Output module for run reporting and downstream collaborators
//!
//! This module handles:
//! - Recording and printing run statistics
//! - Invoking the external formatting and split programs

mod formatter;
pub mod stats;

pub use formatter::{run_collaborator, Formatter, ProcessOutput};
pub use stats::{print_statistics, HarvestStatistics};
