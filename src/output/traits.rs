//! Report writer trait and report types
//!
//! This module defines the trait interface for report writers and the data
//! they persist: broken-link rows and the run summary.

use crate::output::stats::CrawlStatistics;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing a report
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// The second column of a report row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokenStatus {
    /// HTTP status of 400 or above
    Code(u16),

    /// Summarized transport error, or the timeout label
    Error(String),
}

impl fmt::Display for BrokenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{}", code),
            Self::Error(message) => f.write_str(message),
        }
    }
}

/// One report row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenLink {
    /// The page the URL was first discovered on
    pub origin: String,

    /// Status code or error summary
    pub status: BrokenStatus,

    /// The broken URL
    pub url: String,
}

/// Metadata and statistics of one completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub label: String,
    pub start_url: String,

    /// `host[:port]/segment` the run was allowed to crawl
    pub scope: String,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// SHA-256 of the configuration file, if one was loaded
    pub config_hash: Option<String>,

    pub statistics: CrawlStatistics,

    /// Why the start URL itself failed its check, if it did
    pub start_failure: Option<String>,
}

impl RunSummary {
    /// Wall-clock duration of the run in seconds
    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Trait for report writers
///
/// A writer persists the rows of one run and returns where they went.
pub trait ReportWriter {
    /// Writes a run's report
    ///
    /// # Arguments
    ///
    /// * `summary` - The run metadata
    /// * `rows` - Broken links in the order they were recorded
    ///
    /// # Returns
    ///
    /// The path of the file that was written
    fn write(&self, summary: &RunSummary, rows: &[BrokenLink]) -> OutputResult<PathBuf>;
}
