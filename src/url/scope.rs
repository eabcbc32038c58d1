//! Crawl scope and exclusion filtering
//!
//! Two rules decide what happens to a URL:
//! - the discovery rule admits every URL that is not excluded by file type
//!   or ignore-substring; admitted URLs are status-checked
//! - the extraction rule additionally requires the URL to sit inside the
//!   run scope, `host[:port]/<first segment>` of the start URL; only those
//!   pages are downloaded and searched for more links

use crate::config::ScopeConfig;
use crate::url::domain::{extract_netloc, first_path_segment};
use crate::url::matcher::{has_extension, matching_substring};
use std::fmt;
use url::Url;

/// Which rule a URL is tested against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeRule {
    /// Eligible for a status check
    Discovery,
    /// Eligible for link extraction
    Extraction,
}

/// Why a URL was left out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    /// Trailing path segment carries an excluded extension
    FileType(String),
    /// URL contains an ignore-substring
    Substring(String),
    /// URL lies outside the run scope (extraction rule only)
    OffScope,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileType(ext) => write!(f, "excluded file type .{}", ext),
            Self::Substring(needle) => write!(f, "contains ignored substring '{}'", needle),
            Self::OffScope => write!(f, "outside crawl scope"),
        }
    }
}

/// The domain plus version prefix a run is allowed to recurse into
///
/// Computed once from the start URL. For
/// `https://auto.gluon.ai/stable/index.html` the scope is
/// `auto.gluon.ai/stable`, so pages under `/dev/` or on other hosts are
/// checked but never crawled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlScope {
    prefix: String,
}

impl CrawlScope {
    /// Derives the scope from a run's start URL
    pub fn from_start_url(start_url: &Url) -> Self {
        let netloc = extract_netloc(start_url).unwrap_or_default();
        Self {
            prefix: format!("{}/{}", netloc, first_path_segment(start_url)),
        }
    }

    /// Returns true if the URL string contains the scope prefix
    pub fn contains(&self, url: &str) -> bool {
        url.contains(&self.prefix)
    }

    /// The `host[:port]/segment` prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl fmt::Display for CrawlScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix)
    }
}

/// Decides whether URLs are eligible for checking and crawling
///
/// A pure function of configuration and URL string; it holds no crawl state.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    scope: CrawlScope,
    excluded_extensions: Vec<String>,
    ignore_substrings: Vec<String>,
}

impl ScopeFilter {
    /// Creates a filter for the run starting at `start_url`
    pub fn new(start_url: &Url, config: &ScopeConfig) -> Self {
        Self {
            scope: CrawlScope::from_start_url(start_url),
            excluded_extensions: config.excluded_extensions.clone(),
            ignore_substrings: config.ignore_substrings.clone(),
        }
    }

    /// The run scope this filter enforces for extraction
    pub fn scope(&self) -> &CrawlScope {
        &self.scope
    }

    /// Returns the reason a URL is excluded under `rule`, if any
    ///
    /// File-type exclusion is checked first, then ignore-substrings, then
    /// (for extraction) the run scope.
    pub fn exclusion(&self, url: &str, rule: ScopeRule) -> Option<Exclusion> {
        if let Some(ext) = has_extension(url, &self.excluded_extensions) {
            return Some(Exclusion::FileType(ext));
        }

        if let Some(needle) = matching_substring(url, &self.ignore_substrings) {
            return Some(Exclusion::Substring(needle));
        }

        if rule == ScopeRule::Extraction && !self.scope.contains(url) {
            return Some(Exclusion::OffScope);
        }

        None
    }

    /// Returns true if the URL is admitted under `rule`
    pub fn in_scope(&self, url: &str, rule: ScopeRule) -> bool {
        self.exclusion(url, rule).is_none()
    }
}
