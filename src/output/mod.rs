//! Output module for audit reports
//!
//! This module handles:
//! - Collecting broken-link rows for a run (`ReportSink`)
//! - Writing reports as CSV, SQLite or Markdown
//! - Recording and printing run statistics

mod csv_output;
mod markdown;
mod sqlite_output;
pub mod stats;
mod traits;

pub use csv_output::{CsvReportWriter, CSV_HEADER};
pub use markdown::{format_markdown_report, MarkdownReportWriter};
pub use sqlite_output::SqliteReportWriter;
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{BrokenLink, BrokenStatus, OutputError, OutputResult, ReportWriter, RunSummary};

use crate::config::{OutputConfig, OutputFormat};
use std::path::{Path, PathBuf};

/// Accumulates the report rows of one run
///
/// Rows are kept in the order they were recorded; duplicates are kept.
#[derive(Debug, Clone)]
pub struct ReportSink {
    summary: RunSummary,
    rows: Vec<BrokenLink>,
}

impl ReportSink {
    /// Creates an empty sink for a run
    pub fn new(summary: RunSummary) -> Self {
        Self {
            summary,
            rows: Vec::new(),
        }
    }

    /// Appends one row
    pub fn record(
        &mut self,
        origin: impl Into<String>,
        status: BrokenStatus,
        url: impl Into<String>,
    ) {
        self.rows.push(BrokenLink {
            origin: origin.into(),
            status,
            url: url.into(),
        });
    }

    pub fn rows(&self) -> &[BrokenLink] {
        &self.rows
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// The run label the report is keyed by
    pub fn label(&self) -> &str {
        &self.summary.label
    }

    /// Persists every row with the given writer
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Where the report was written
    /// * `Err(OutputError)` - The report could not be written
    pub fn flush(&self, writer: &dyn ReportWriter) -> OutputResult<PathBuf> {
        let path = writer.write(&self.summary, &self.rows)?;
        tracing::info!(
            "Wrote {} broken links for '{}' to {}",
            self.rows.len(),
            self.summary.label,
            path.display()
        );
        Ok(path)
    }
}

/// File name of a per-run report: `Broken Links <label>.<ext>`
pub fn report_file_name(label: &str, extension: &str) -> String {
    format!("Broken Links {}.{}", label, extension)
}

/// Builds the writer selected by the output configuration
pub fn writer_for(config: &OutputConfig) -> Box<dyn ReportWriter> {
    let directory = Path::new(&config.directory);

    match config.format {
        OutputFormat::Csv => Box::new(CsvReportWriter::new(directory)),
        OutputFormat::Sqlite => Box::new(SqliteReportWriter::new(
            directory.join(&config.database_name),
        )),
        OutputFormat::Markdown => Box::new(MarkdownReportWriter::new(directory)),
    }
}
