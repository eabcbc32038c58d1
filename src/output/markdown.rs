//! Markdown report generation
//!
//! This module renders a human-readable report of one run: run information,
//! statistics and a table of broken links.

use crate::output::report_file_name;
use crate::output::traits::{BrokenLink, OutputResult, ReportWriter, RunSummary};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

/// Writes reports as Markdown files into a directory
#[derive(Debug, Clone)]
pub struct MarkdownReportWriter {
    directory: PathBuf,
}

impl MarkdownReportWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl ReportWriter for MarkdownReportWriter {
    fn write(&self, summary: &RunSummary, rows: &[BrokenLink]) -> OutputResult<PathBuf> {
        fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(report_file_name(&summary.label, "md"));

        let markdown = format_markdown_report(summary, rows);
        let mut file = File::create(&path)?;
        file.write_all(markdown.as_bytes())?;

        Ok(path)
    }
}

/// Formats a run report as markdown
///
/// # Arguments
///
/// * `summary` - The run metadata and statistics
/// * `rows` - Broken links in the order they were recorded
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_report(summary: &RunSummary, rows: &[BrokenLink]) -> String {
    let stats = &summary.statistics;
    let mut md = String::new();

    md.push_str(&format!("# Broken Links: {}\n\n", summary.label));

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Start URL**: {}\n", summary.start_url));
    md.push_str(&format!("- **Scope**: `{}`\n", summary.scope));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", summary.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.1} seconds\n",
        summary.duration_seconds()
    ));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    if let Some(failure) = &summary.start_failure {
        md.push_str(&format!("- **Start URL Failure**: {}\n", failure));
    }
    md.push('\n');

    // Statistics
    md.push_str("## Statistics\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Pages visited | {} |\n", stats.pages_visited));
    md.push_str(&format!("| Pages extracted | {} |\n", stats.pages_extracted));
    md.push_str(&format!(
        "| Extraction failures | {} |\n",
        stats.extraction_failures
    ));
    md.push_str(&format!("| Links discovered | {} |\n", stats.links_discovered));
    md.push_str(&format!("| URLs excluded | {} |\n", stats.urls_excluded));
    md.push_str(&format!("| Checks performed | {} |\n", stats.checks_performed));
    md.push_str(&format!("| Suppressed errors | {} |\n", stats.suppressed_errors));
    md.push_str(&format!("| Broken links | {} |\n\n", rows.len()));

    // Findings
    md.push_str("## Broken Links\n\n");
    if rows.is_empty() {
        md.push_str("No broken links found.\n");
    } else {
        md.push_str("| Origin Webpage | Status Code / Error | URL |\n");
        md.push_str("|----------------|---------------------|-----|\n");
        for row in rows {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&row.origin),
                escape_cell(&row.status.to_string()),
                escape_cell(&row.url)
            ));
        }
    }

    md
}

/// Escapes pipes so a value stays inside its table cell
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::sample_summary;
    use crate::output::BrokenStatus;
    use tempfile::TempDir;

    #[test]
    fn test_format_report_with_rows() {
        let rows = vec![BrokenLink {
            origin: "https://example.com/docs/index.html".to_string(),
            status: BrokenStatus::Code(404),
            url: "https://example.com/docs/b.html".to_string(),
        }];

        let md = format_markdown_report(&sample_summary("Stable"), &rows);

        assert!(md.starts_with("# Broken Links: Stable"));
        assert!(md.contains("## Run Information"));
        assert!(md.contains(
            "| https://example.com/docs/index.html | 404 | https://example.com/docs/b.html |"
        ));
        assert!(md.contains("| Broken links | 1 |"));
    }

    #[test]
    fn test_format_empty_report() {
        let md = format_markdown_report(&sample_summary("Dev"), &[]);
        assert!(md.contains("No broken links found."));
        assert!(!md.contains("| Origin Webpage |"));
    }

    #[test]
    fn test_start_failure_shown() {
        let mut summary = sample_summary("Stable");
        summary.start_failure = Some("Request timed out".to_string());

        let md = format_markdown_report(&summary, &[]);
        assert!(md.contains("- **Start URL Failure**: Request timed out"));
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("a|b"), "a\\|b");
    }

    #[test]
    fn test_write_markdown_file() {
        let temp_dir = TempDir::new().unwrap();
        let writer = MarkdownReportWriter::new(temp_dir.path());

        let path = writer.write(&sample_summary("Stable"), &[]).unwrap();
        assert_eq!(path, temp_dir.path().join("Broken Links Stable.md"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# Broken Links: Stable"));
    }
}
