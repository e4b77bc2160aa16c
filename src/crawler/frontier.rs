//! Crawl frontier
//!
//! The frontier is the single consumer of the results stream and the only
//! owner of the visited set, so deduplication needs no locking. It keeps
//! count of the tasks it has handed out and not yet seen come back; when
//! that count drops to zero nothing can discover new work any more and the
//! work queue is closed, which lets the workers drain and exit.

use crate::crawler::{CrawlBudget, FetchResult, Task};
use crate::output::{CrawlStats, RecordSink, ResultWriter, StatsCollector};
use std::collections::HashSet;
use std::io::Write;
use tokio::sync::mpsc;
use url::Url;

/// Outcome of a crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Aggregated statistics
    pub stats: CrawlStats,

    /// Every discovered URL that was enqueued (seeds excluded)
    pub visited: HashSet<String>,

    /// Whether expansion was stopped by the budget
    pub cancelled: bool,
}

pub struct Frontier {
    /// Discovered URLs already enqueued; counts against the budget
    visited: HashSet<String>,

    /// Seed URLs; deduplicated against but free of charge
    seeds: HashSet<String>,

    /// Sending half of the work queue, `None` once closed
    work: Option<mpsc::Sender<Task>>,

    budget: CrawlBudget,
    stats: StatsCollector,

    /// Tasks enqueued whose result has not come back yet
    pending: usize,

    cancelled: bool,
}

impl Frontier {
    pub fn new(work: mpsc::Sender<Task>, budget: CrawlBudget) -> Self {
        Self {
            visited: HashSet::new(),
            seeds: HashSet::new(),
            work: Some(work),
            budget,
            stats: StatsCollector::new(),
            pending: 0,
            cancelled: false,
        }
    }

    /// Enqueues the seed URLs, skipping duplicates
    ///
    /// # Returns
    ///
    /// The number of seeds enqueued
    pub async fn seed<I>(&mut self, seeds: I) -> usize
    where
        I: IntoIterator<Item = Url>,
    {
        let mut enqueued = 0;
        for url in seeds {
            if !self.seeds.insert(url.to_string()) {
                tracing::debug!("Skipping duplicate seed {}", url);
                continue;
            }
            if self.enqueue(Task::seed(url)).await {
                enqueued += 1;
            }
        }

        tracing::info!("Seeded frontier with {} URLs", enqueued);
        enqueued
    }

    /// Consumes results until every worker is done
    ///
    /// Each result is recorded (or reported as a failure), counted in the
    /// statistics and, unless expansion has been stopped, expanded.
    pub async fn run<S, D>(
        mut self,
        mut results: mpsc::Receiver<FetchResult>,
        writer: &mut ResultWriter<S, D>,
    ) -> CrawlReport
    where
        S: RecordSink,
        D: Write,
    {
        if self.pending == 0 {
            self.close_work_queue();
        }

        while let Some(result) = results.recv().await {
            self.pending = self.pending.saturating_sub(1);

            if result.is_error() {
                self.stats.record_error();
                writer.diagnose(&result);
            } else {
                self.stats.observe(&result);
                writer.record(&result);
                if !self.cancelled {
                    self.expand(&result).await;
                }
            }

            if self.pending == 0 {
                self.close_work_queue();
            }
        }

        tracing::info!(
            "Crawl finished: {} fetched, {} failed, {} discovered",
            self.stats.success(),
            self.stats.errors(),
            self.visited.len()
        );

        CrawlReport {
            stats: self.stats.finalize(),
            visited: self.visited,
            cancelled: self.cancelled,
        }
    }

    /// Enqueues every link of `result` not seen before
    async fn expand(&mut self, result: &FetchResult) {
        for url in &result.urls {
            if self.work.is_none() {
                break;
            }

            let key = url.to_string();
            if self.seeds.contains(&key) || !self.visited.insert(key) {
                continue;
            }

            self.enqueue(Task {
                from: Some(result.url.clone()),
                to: url.clone(),
            })
            .await;

            if self.budget.is_exhausted(self.visited.len()) {
                tracing::info!(
                    "Reached the limit of {} URLs, no further expansion",
                    self.budget.limit()
                );
                self.cancelled = true;
                self.close_work_queue();
                break;
            }
        }
    }

    /// Hands a task to the workers
    async fn enqueue(&mut self, task: Task) -> bool {
        let Some(work) = &self.work else {
            return false;
        };

        let sent = work.send(task).await;
        match sent {
            Ok(()) => {
                self.pending += 1;
                true
            }
            Err(rejected) => {
                tracing::warn!("No workers left to fetch {}", rejected.0.to);
                self.close_work_queue();
                false
            }
        }
    }

    fn close_work_queue(&mut self) {
        if self.work.take().is_some() {
            tracing::debug!("Work queue closed with {} tasks outstanding", self.pending);
        }
    }
}
