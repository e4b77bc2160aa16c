//! Worker pool
//!
//! Each worker loops Idle → Fetching → Idle until either no task arrives
//! within the idle timeout or the work queue is closed and drained. Results
//! are handed to the results channel on short-lived dispatch tasks so a full
//! results channel never keeps a worker from picking up more work; a worker
//! only returns once all of its dispatches have delivered.

use crate::crawler::{Fetch, FetchResult, Task};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{JoinHandle, JoinSet};

/// Receiving end of the work queue, shared by every worker
pub type WorkQueue = Arc<Mutex<mpsc::Receiver<Task>>>;

/// Why a worker terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// No task arrived within the idle timeout
    Idle,
    /// The work queue was closed and drained
    Closed,
}

/// Runs one worker until it goes idle or the queue closes
///
/// # Arguments
///
/// * `id` - Worker number, for logging
/// * `fetcher` - Turns each task into a result
/// * `work` - Shared work queue
/// * `results` - Where results are delivered
/// * `idle_timeout` - How long to wait for a task; restarts after every task
pub async fn run_worker<F: Fetch>(
    id: usize,
    fetcher: Arc<F>,
    work: WorkQueue,
    results: mpsc::Sender<FetchResult>,
    idle_timeout: Duration,
) -> WorkerExit {
    tracing::trace!("Worker {} started", id);

    let mut dispatches = JoinSet::new();
    let mut fetched = 0usize;

    let exit = loop {
        let next = tokio::time::timeout(idle_timeout, async { work.lock().await.recv().await })
            .await;

        let task = match next {
            Ok(Some(task)) => task,
            Ok(None) => break WorkerExit::Closed,
            Err(_) => break WorkerExit::Idle,
        };

        tracing::trace!("Worker {} fetching {}", id, task.to);
        let result = fetcher.fetch(task).await;
        fetched += 1;

        let results = results.clone();
        dispatches.spawn(async move {
            if results.send(result).await.is_err() {
                tracing::warn!("Result stream closed, dropping a result");
            }
        });
    };

    // Results still in flight must be delivered before this worker counts as done
    while dispatches.join_next().await.is_some() {}

    tracing::debug!("Worker {} stopped ({:?}) after {} fetches", id, exit, fetched);
    exit
}

/// A fixed-size pool of workers sharing one work queue
pub struct WorkerPool {
    handles: Vec<JoinHandle<WorkerExit>>,
}

impl WorkerPool {
    /// Spawns `concurrency` workers
    ///
    /// Both channels are bounded at `capacity`. The results receiver yields
    /// `None` once every worker and every pending dispatch has finished.
    ///
    /// # Returns
    ///
    /// The work queue sender, the results receiver and the pool
    pub fn spawn<F: Fetch>(
        fetcher: Arc<F>,
        concurrency: usize,
        idle_timeout: Duration,
        capacity: usize,
    ) -> (mpsc::Sender<Task>, mpsc::Receiver<FetchResult>, WorkerPool) {
        let (work_tx, work_rx) = mpsc::channel(capacity.max(1));
        let (results_tx, results_rx) = mpsc::channel(capacity.max(1));
        let work: WorkQueue = Arc::new(Mutex::new(work_rx));

        let handles = (0..concurrency)
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    Arc::clone(&fetcher),
                    Arc::clone(&work),
                    results_tx.clone(),
                    idle_timeout,
                ))
            })
            .collect();

        tracing::debug!("Spawned {} workers", concurrency);

        (work_tx, results_rx, WorkerPool { handles })
    }

    /// Number of workers in the pool
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns true if the pool has no workers
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Waits for every worker and reports how each one exited
    pub async fn join(self) -> Vec<WorkerExit> {
        let mut exits = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            match handle.await {
                Ok(exit) => exits.push(exit),
                Err(e) => tracing::error!("Worker task failed: {}", e),
            }
        }
        exits
    }
}
