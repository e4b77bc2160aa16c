//! Crawl budget and cooperative cancellation
//!
//! The budget is the one value shared between the frontier and an outside
//! actor (the interrupt handler). The frontier only reads it; the outside
//! actor only ever calls [`CrawlBudget::cancel`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Maximum number of discovered URLs the crawl may enqueue (0 = unbounded)
#[derive(Debug, Clone)]
pub struct CrawlBudget {
    limit: Arc<AtomicUsize>,
}

impl CrawlBudget {
    /// Creates a budget; `limit` of 0 means unbounded
    pub fn new(limit: usize) -> Self {
        Self {
            limit: Arc::new(AtomicUsize::new(limit)),
        }
    }

    /// Creates an unbounded budget
    pub fn unbounded() -> Self {
        Self::new(0)
    }

    /// Current limit
    pub fn limit(&self) -> usize {
        self.limit.load(Ordering::Acquire)
    }

    /// Stops further expansion at the next newly discovered URL
    ///
    /// Fetches already in flight still complete and are reported.
    pub fn cancel(&self) {
        self.limit.store(1, Ordering::Release);
    }

    /// Returns true if `discovered` URLs use up the budget
    pub fn is_exhausted(&self, discovered: usize) -> bool {
        let limit = self.limit();
        limit > 0 && discovered >= limit
    }
}

impl Default for CrawlBudget {
    fn default() -> Self {
        Self::unbounded()
    }
}
