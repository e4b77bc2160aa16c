//! Crawler module for concurrent page fetching and link expansion
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and response timing
//! - HTML and sitemap parsing for link extraction
//! - A pool of workers sharing one bounded work queue
//! - The frontier, which deduplicates links and enforces the URL budget

mod budget;
mod fetcher;
mod frontier;
mod parser;
#[cfg(test)]
mod testing;
mod worker;

pub use budget::CrawlBudget;
pub use fetcher::{build_http_client, Fetch, FetchError, FetchResult, Fetcher, Task};
pub use frontier::{CrawlReport, Frontier};
pub use parser::{parse_document, ParsedPage};
pub use worker::{run_worker, WorkQueue, WorkerExit, WorkerPool};

use crate::config::Config;
use crate::output::{RecordSink, ResultWriter};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Channel slots per worker, for both the work queue and the results stream
const CHANNEL_CAPACITY_PER_WORKER: usize = 100;

/// Runtime parameters of a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSettings {
    /// Number of workers
    pub concurrency: usize,

    /// How long a worker waits for a task before exiting
    pub idle_timeout: Duration,
}

impl CrawlSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            concurrency: config.crawler.concurrency,
            idle_timeout: config.idle_timeout(),
        }
    }
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Spawn the worker pool
/// 2. Seed the frontier
/// 3. Record, count and expand every result until the work runs out
/// 4. Wait for every worker to exit
///
/// # Arguments
///
/// * `fetcher` - Turns tasks into results
/// * `seeds` - Starting URLs
/// * `settings` - Concurrency and idle timeout
/// * `budget` - Limit on discovered URLs, also used to cancel the crawl
/// * `writer` - Destination for records and diagnostics
///
/// # Returns
///
/// The final statistics and the set of discovered URLs
pub async fn crawl<F, S, D>(
    fetcher: Arc<F>,
    seeds: Vec<Url>,
    settings: &CrawlSettings,
    budget: CrawlBudget,
    writer: &mut ResultWriter<S, D>,
) -> CrawlReport
where
    F: Fetch,
    S: RecordSink,
    D: Write,
{
    let capacity = CHANNEL_CAPACITY_PER_WORKER * settings.concurrency.max(1);
    let (work, results, pool) = WorkerPool::spawn(
        fetcher,
        settings.concurrency,
        settings.idle_timeout,
        capacity,
    );

    let mut frontier = Frontier::new(work, budget);
    frontier.seed(seeds).await;
    let report = frontier.run(results, writer).await;

    let exits = pool.join().await;
    let idle = exits.iter().filter(|e| **e == WorkerExit::Idle).count();
    tracing::debug!(
        "{} workers exited ({} idle, {} on close)",
        exits.len(),
        idle,
        exits.len() - idle
    );

    report
}
