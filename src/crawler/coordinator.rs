//! Crawler coordinator - main audit orchestration logic
//!
//! This module contains the batch loop of one audit run:
//! - Taking a batch of pending URLs from the frontier
//! - Extraction phase: downloading in-scope pages and merging their links
//! - Check phase: issuing a HEAD for every batch URL and recording failures
//! - Building the run summary once the frontier is exhausted
//!
//! The coordinator is the only owner of `CrawlState`. Worker tasks return
//! values which are merged here in completion order.

use crate::config::Config;
use crate::crawler::fetcher::{FetchError, FetchMethod, FetchResponse, Fetcher};
use crate::crawler::parser::extract_links_from;
use crate::crawler::scheduler::Scheduler;
use crate::output::{CrawlStatistics, ReportSink, RunSummary};
use crate::state::{CheckOutcome, CrawlState, TIMEOUT_LABEL};
use crate::url::{parse_start_url, ScopeFilter, ScopeRule};
use crate::Result;
use chrono::Utc;
use std::collections::HashSet;
use std::time::Instant;

/// What the extraction download of one page produced
enum Extraction {
    /// Page answered 200; links found in the body
    Links(HashSet<String>),

    /// Page answered with another status; nothing to extract
    NoBody(u16),

    /// Download failed or timed out
    Failed(FetchError),
}

/// Result of one extraction task
struct ExtractedPage {
    page: String,
    extraction: Extraction,
}

/// Coordinates one audit run from start URL to report rows
pub struct Coordinator {
    label: String,
    start_url: String,
    scope: ScopeFilter,
    fetcher: Fetcher,
    scheduler: Scheduler,
    state: CrawlState,
    stats: CrawlStatistics,
    start_failure: Option<String>,
    config_hash: Option<String>,
}

impl Coordinator {
    /// Creates a coordinator for one run
    ///
    /// # Arguments
    ///
    /// * `start_url` - Absolute URL the crawl starts from
    /// * `label` - Name the run's report is keyed by
    /// * `config` - The audit configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(AuditError)` - Invalid start URL or HTTP client setup failure
    pub fn new(start_url: &str, label: &str, config: &Config) -> Result<Self> {
        let start = parse_start_url(start_url)?;
        let start_url = start.to_string();

        Ok(Self {
            label: label.to_string(),
            scope: ScopeFilter::new(&start, &config.scope),
            fetcher: Fetcher::new(config)?,
            scheduler: Scheduler::from_config(&config.crawler),
            state: CrawlState::new(start_url.clone()),
            start_url,
            stats: CrawlStatistics::default(),
            start_failure: None,
            config_hash: None,
        })
    }

    /// Attaches the hash of the configuration file to the run summary
    pub fn with_config_hash(mut self, config_hash: Option<String>) -> Self {
        self.config_hash = config_hash;
        self
    }

    pub fn scope(&self) -> &ScopeFilter {
        &self.scope
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    /// Runs the batch loop until no discovered URL is left unvisited
    ///
    /// Each batch is processed in two phases: every in-scope page of the
    /// batch is downloaded and its links merged into the frontier, then every
    /// URL of the batch is status-checked. A phase finishes completely before
    /// the next one starts.
    ///
    /// No per-URL failure aborts the run; failures end up as report rows or
    /// log lines.
    pub async fn run(mut self) -> ReportSink {
        let started_at = Utc::now();
        let timer = Instant::now();

        tracing::info!(
            "Starting audit '{}' at {} (scope: {})",
            self.label,
            self.start_url,
            self.scope.scope()
        );

        while !self.state.is_done() {
            let batch = self.scheduler.next_batch(&mut self.state);

            self.stats.batches += 1;
            self.stats.pages_visited += batch.len() as u64;
            tracing::debug!("Batch {}: {} URLs", self.stats.batches, batch.len());

            self.extraction_phase(&batch).await;
            self.check_phase(&batch).await;

            let rate = self.stats.pages_visited as f64 / timer.elapsed().as_secs_f64().max(0.001);
            tracing::info!(
                "Progress: {} discovered, {} visited, {} pending, {} broken, {:.2} pages/sec",
                self.state.discovered_count(),
                self.state.visited_count(),
                self.state.pending_count(),
                self.state.broken().len(),
                rate
            );
        }

        tracing::info!("Frontier is empty, audit '{}' complete", self.label);
        self.stats.broken_links = self.state.broken().len() as u64;

        tracing::info!(
            "Audit '{}' completed: {} pages visited, {} broken links in {:?}",
            self.label,
            self.stats.pages_visited,
            self.stats.broken_links,
            timer.elapsed()
        );

        let summary = RunSummary {
            label: self.label,
            start_url: self.start_url,
            scope: self.scope.scope().to_string(),
            started_at,
            finished_at: Utc::now(),
            config_hash: self.config_hash,
            statistics: self.stats,
            start_failure: self.start_failure,
        };

        let mut sink = ReportSink::new(summary);
        for row in self.state.into_broken() {
            sink.record(row.origin, row.status, row.url);
        }
        sink
    }

    /// Downloads every batch page inside the run scope and merges its links
    async fn extraction_phase(&mut self, batch: &[String]) {
        let mut pages = Vec::with_capacity(batch.len());
        for url in batch {
            match self.scope.exclusion(url, ScopeRule::Extraction) {
                Some(reason) => tracing::debug!("Not extracting links from {}: {}", url, reason),
                None => pages.push(url.clone()),
            }
        }

        let fetcher = self.fetcher.clone();
        let mut tasks = self.scheduler.spawn_phase(pages, move |page| {
            let fetcher = fetcher.clone();
            async move {
                let extraction = match fetcher.fetch(&page, FetchMethod::Get).await {
                    Ok(FetchResponse {
                        body: Some(body), ..
                    }) => Extraction::Links(extract_links_from(&page, &body)),
                    Ok(response) => Extraction::NoBody(response.status),
                    Err(error) => Extraction::Failed(error),
                };
                ExtractedPage { page, extraction }
            }
        });

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(extracted) => self.merge_extraction(extracted),
                Err(e) => tracing::error!("Extraction task failed: {}", e),
            }
        }
    }

    /// Adds the links of one page to the frontier
    ///
    /// Links excluded under the discovery rule are dropped here, so they are
    /// never fetched and never reported.
    fn merge_extraction(&mut self, extracted: ExtractedPage) {
        let ExtractedPage { page, extraction } = extracted;

        match extraction {
            Extraction::Links(links) => {
                self.stats.pages_extracted += 1;
                let mut new_links = 0;

                for link in links {
                    if let Some(reason) = self.scope.exclusion(&link, ScopeRule::Discovery) {
                        tracing::debug!("Skipping {} (found on {}): {}", link, page, reason);
                        self.stats.urls_excluded += 1;
                        continue;
                    }

                    if self.state.discover(&link, &page) {
                        new_links += 1;
                    }
                }

                self.stats.links_discovered += new_links;
                tracing::debug!("Found {} new links on {}", new_links, page);
            }
            Extraction::NoBody(status) => {
                tracing::debug!("No links extracted from {} (HTTP {})", page, status);
            }
            Extraction::Failed(FetchError::Timeout) => {
                self.stats.extraction_failures += 1;
                tracing::warn!("{} while crawling {}", TIMEOUT_LABEL, page);
            }
            Extraction::Failed(error) => {
                // The page is already known; its check reports the failure
                self.stats.extraction_failures += 1;
                tracing::warn!("Error while crawling {}: {}", page, error);
            }
        }
    }

    /// Issues a HEAD for every batch URL admitted by the discovery rule
    async fn check_phase(&mut self, batch: &[String]) {
        let mut urls = Vec::with_capacity(batch.len());
        for url in batch {
            match self.scope.exclusion(url, ScopeRule::Discovery) {
                Some(reason) => {
                    tracing::debug!("Not checking {}: {}", url, reason);
                    self.stats.urls_excluded += 1;
                }
                None => urls.push(url.clone()),
            }
        }

        let fetcher = self.fetcher.clone();
        let mut tasks = self.scheduler.spawn_phase(urls, move |url| {
            let fetcher = fetcher.clone();
            async move {
                let result = fetcher.fetch(&url, FetchMethod::Head).await;
                let outcome = CheckOutcome::from_fetch(&result);
                (url, outcome)
            }
        });

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((url, outcome)) => self.record_outcome(&url, outcome),
                Err(e) => tracing::error!("Check task failed: {}", e),
            }
        }
    }

    /// Turns a check outcome into a report row, if it is broken
    ///
    /// The row's origin is the page the URL was first found on; the start URL
    /// is its own origin. A timed-out start URL is logged without a row.
    fn record_outcome(&mut self, url: &str, outcome: CheckOutcome) {
        self.stats.checks_performed += 1;

        if outcome.is_suppressed() {
            self.stats.suppressed_errors += 1;
            tracing::debug!("Ignoring pool exhaustion while checking {}", url);
            return;
        }

        let Some(status) = outcome.broken_status() else {
            tracing::trace!("{} is fine ({:?})", url, outcome);
            return;
        };

        if self.state.is_root(url) {
            tracing::error!("Start URL {} failed: {}", url, status);
            self.start_failure = Some(status.to_string());
            if outcome == CheckOutcome::Timeout {
                return;
            }
        }

        let origin = self
            .state
            .parent_of(url)
            .unwrap_or_else(|| self.state.root())
            .to_string();

        tracing::warn!("Broken link on {}: {} ({})", origin, url, status);
        self.state.record_broken(&origin, status, url);
    }
}
