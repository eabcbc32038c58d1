//! Batch scheduling and the worker pool
//!
//! This module handles:
//! - Choosing the next batch of frontier URLs (at most `max-workers`)
//! - Bounding in-flight requests with a shared semaphore
//! - Spawning one task per URL for each crawl phase
//!
//! Workers never touch crawl state; each task returns a value that the
//! coordinator merges as tasks complete.

use crate::config::CrawlerConfig;
use crate::state::CrawlState;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Scheduler for one audit run
///
/// The scheduler coordinates:
/// - Batch size (one batch per frontier round)
/// - Global concurrency (max requests in flight across a phase)
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// Global semaphore for limiting concurrent requests
    permits: Arc<Semaphore>,

    /// Pool size, also the batch size
    max_workers: usize,
}

impl Scheduler {
    /// Creates a scheduler with `max_workers` permits
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_workers)),
            max_workers,
        }
    }

    /// Creates a scheduler sized from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.max_workers as usize)
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Takes the next batch of pending URLs from the frontier
    ///
    /// Returned URLs are marked visited before any request is made.
    pub fn next_batch(&self, state: &mut CrawlState) -> Vec<String> {
        state.next_batch(self.max_workers)
    }

    /// Spawns `task` once per URL, at most `max_workers` running at a time
    ///
    /// # Arguments
    ///
    /// * `urls` - The URLs of this phase
    /// * `task` - Builds the future for one URL
    ///
    /// # Returns
    ///
    /// A `JoinSet` yielding task results in completion order.
    pub fn spawn_phase<T, F, Fut>(&self, urls: Vec<String>, task: F) -> JoinSet<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let mut tasks = JoinSet::new();

        for url in urls {
            let permits = Arc::clone(&self.permits);
            let job = task(url);

            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition only waits
                let _permit = permits.acquire_owned().await.ok();
                job.await
            });
        }

        tasks
    }
}
