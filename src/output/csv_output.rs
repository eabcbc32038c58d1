//! CSV report writer
//!
//! Writes `Broken Links <label>.csv` with one row per broken link.

use crate::output::report_file_name;
use crate::output::traits::{BrokenLink, OutputResult, ReportWriter, RunSummary};
use std::fs;
use std::path::PathBuf;

/// Column header of every CSV report
pub const CSV_HEADER: [&str; 3] = ["Origin Webpage", "Status Code / Error", "URL"];

/// Writes reports as CSV files into a directory
#[derive(Debug, Clone)]
pub struct CsvReportWriter {
    directory: PathBuf,
}

impl CsvReportWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl ReportWriter for CsvReportWriter {
    fn write(&self, summary: &RunSummary, rows: &[BrokenLink]) -> OutputResult<PathBuf> {
        fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(report_file_name(&summary.label, "csv"));

        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(CSV_HEADER)?;

        for row in rows {
            let status = row.status.to_string();
            writer.write_record([row.origin.as_str(), status.as_str(), row.url.as_str()])?;
        }

        writer.flush()?;
        Ok(path)
    }
}
