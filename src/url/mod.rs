//! URL handling module for Sumi-Audit
//!
//! This module provides start-URL validation, network-location extraction,
//! file-type and substring matching, and the scope filter that decides which
//! URLs a run checks and which it crawls.

mod domain;
mod matcher;
mod scope;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use domain::{extract_netloc, first_path_segment};
pub use matcher::{file_extension, has_extension, matching_substring};
pub use scope::{CrawlScope, Exclusion, ScopeFilter, ScopeRule};

/// Parses and validates a run's start URL
///
/// The start URL must be absolute and carry both a scheme and a host.
///
/// # Examples
///
/// ```
/// use sumi_audit::url::parse_start_url;
///
/// assert!(parse_start_url("https://auto.gluon.ai/stable/index.html").is_ok());
/// assert!(parse_start_url("/stable/index.html").is_err());
/// ```
pub fn parse_start_url(raw: &str) -> UrlResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if url.scheme().is_empty() {
        return Err(UrlError::MissingScheme(raw.to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost(raw.to_string()));
    }

    Ok(url)
}
