//! Frontier and per-run crawl state
//!
//! A `CrawlState` is created fresh for every run, owned by the coordinator,
//! and dropped once the run's report has been handed to the report sink.

use crate::output::{BrokenLink, BrokenStatus};
use std::collections::{HashMap, HashSet};

/// Discovered/visited sets, parent attribution and broken results of one run
///
/// Invariants:
/// - `visited ⊆ discovered`, and `pending == discovered \ visited`
/// - every key of `parent_of` is in `discovered`
/// - a parent entry, once written, is never overwritten
#[derive(Debug, Clone)]
pub struct CrawlState {
    root: String,
    discovered: HashSet<String>,
    visited: HashSet<String>,
    pending: HashSet<String>,
    parent_of: HashMap<String, String>,
    broken: Vec<BrokenLink>,
}

impl CrawlState {
    /// Creates the state for a run seeded with `start_url`
    ///
    /// The start URL is its own parent.
    pub fn new(start_url: impl Into<String>) -> Self {
        let root = start_url.into();

        let mut state = Self {
            root: root.clone(),
            discovered: HashSet::new(),
            visited: HashSet::new(),
            pending: HashSet::new(),
            parent_of: HashMap::new(),
            broken: Vec::new(),
        };
        state.discover(&root, &root);
        state
    }

    /// The start URL of the run
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Returns true if `url` is the start URL
    pub fn is_root(&self, url: &str) -> bool {
        self.root == url
    }

    /// Adds a URL found on `parent`
    ///
    /// Returns true if the URL had not been seen before. Known URLs are left
    /// untouched, so the first page to link a URL stays its parent.
    pub fn discover(&mut self, url: &str, parent: &str) -> bool {
        if self.discovered.contains(url) {
            return false;
        }

        self.discovered.insert(url.to_string());
        self.pending.insert(url.to_string());
        self.parent_of
            .entry(url.to_string())
            .or_insert_with(|| parent.to_string());
        true
    }

    /// Pulls up to `max` pending URLs and marks them visited
    ///
    /// Selection order is arbitrary. URLs returned here are never returned
    /// again, even if they are rediscovered later.
    pub fn next_batch(&mut self, max: usize) -> Vec<String> {
        let batch: Vec<String> = self.pending.iter().take(max).cloned().collect();

        for url in &batch {
            self.pending.remove(url);
            self.visited.insert(url.clone());
        }

        batch
    }

    /// The page a URL was first found on
    pub fn parent_of(&self, url: &str) -> Option<&str> {
        self.parent_of.get(url).map(String::as_str)
    }

    /// Appends a broken-link finding
    pub fn record_broken(&mut self, origin: &str, status: BrokenStatus, url: &str) {
        self.broken.push(BrokenLink {
            origin: origin.to_string(),
            status,
            url: url.to_string(),
        });
    }

    /// Broken-link findings in the order they were recorded
    pub fn broken(&self) -> &[BrokenLink] {
        &self.broken
    }

    /// Consumes the state, returning its findings
    pub fn into_broken(self) -> Vec<BrokenLink> {
        self.broken
    }

    /// Returns true if every discovered URL has been visited
    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_discovered(&self, url: &str) -> bool {
        self.discovered.contains(url)
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn discovered_count(&self) -> usize {
        self.discovered.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
