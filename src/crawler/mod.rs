//! Crawler module for page fetching and link checking
//!
//! This module contains the core auditing logic, including:
//! - HTTP fetching with timeout and error classification
//! - HTML link extraction
//! - Batch scheduling and the bounded worker pool
//! - Overall audit coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::Coordinator;
pub use fetcher::{
    build_http_client, classify_error, is_pool_exhaustion_message, FetchError, FetchMethod,
    FetchResponse, Fetcher,
};
pub use parser::{extract_links, extract_links_from};
pub use scheduler::Scheduler;

use crate::config::Config;
use crate::output::ReportSink;
use crate::Result;

/// Audits one documentation site
///
/// This is the main entry point for a run. It will:
/// 1. Validate the start URL and derive the crawl scope
/// 2. Build the HTTP client
/// 3. Crawl and check batch by batch until the frontier is empty
/// 4. Return the collected report rows and run summary
///
/// # Arguments
///
/// * `start_url` - Absolute URL of the site's entry page
/// * `label` - Name the report is keyed by
/// * `config` - The audit configuration
///
/// # Returns
///
/// * `Ok(ReportSink)` - The run completed; rows may be empty
/// * `Err(AuditError)` - The run could not start
pub async fn audit_site(start_url: &str, label: &str, config: &Config) -> Result<ReportSink> {
    let coordinator = Coordinator::new(start_url, label, config)?;
    Ok(coordinator.run().await)
}
