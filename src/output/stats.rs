//! Run statistics
//!
//! Counters collected by the coordinator while a run progresses, and the
//! stdout summary printed after each run.

use crate::output::traits::RunSummary;

/// Counters for one audit run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Frontier rounds processed
    pub batches: u64,

    /// URLs taken from the frontier
    pub pages_visited: u64,

    /// Pages downloaded and searched for links
    pub pages_extracted: u64,

    /// Extraction downloads that timed out or failed
    pub extraction_failures: u64,

    /// New URLs added to the frontier
    pub links_discovered: u64,

    /// Links and URLs skipped by file type or ignore-substring
    pub urls_excluded: u64,

    /// HEAD checks issued
    pub checks_performed: u64,

    /// Check errors dropped because the local pool was saturated
    pub suppressed_errors: u64,

    /// Report rows recorded
    pub broken_links: u64,
}

impl CrawlStatistics {
    /// Share of checks that produced a report row, as a percentage
    pub fn broken_rate(&self) -> f64 {
        if self.checks_performed == 0 {
            return 0.0;
        }
        (self.broken_links as f64 / self.checks_performed as f64) * 100.0
    }
}

/// Prints a run summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The run to display
pub fn print_statistics(summary: &RunSummary) {
    let stats = &summary.statistics;

    println!("=== Audit Statistics: {} ===\n", summary.label);

    println!("Run:");
    println!("  Start URL: {}", summary.start_url);
    println!("  Scope: {}", summary.scope);
    println!("  Duration: {:.1}s", summary.duration_seconds());
    if let Some(hash) = &summary.config_hash {
        println!("  Config hash: {}", hash);
    }
    println!();

    println!("Crawl:");
    println!("  Batches: {}", stats.batches);
    println!("  Pages visited: {}", stats.pages_visited);
    println!("  Pages extracted: {}", stats.pages_extracted);
    println!("  Extraction failures: {}", stats.extraction_failures);
    println!("  Links discovered: {}", stats.links_discovered);
    println!("  URLs excluded: {}", stats.urls_excluded);
    println!();

    println!("Checks:");
    println!("  Checks performed: {}", stats.checks_performed);
    println!("  Suppressed errors: {}", stats.suppressed_errors);
    println!(
        "  Broken links: {} ({:.1}% of checks)",
        stats.broken_links,
        stats.broken_rate()
    );

    if let Some(failure) = &summary.start_failure {
        println!();
        println!("Start URL failed: {}", failure);
    }
}
