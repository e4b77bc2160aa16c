//! Crawl statistics
//!
//! Successful fetches feed the latency figures and the status histogram;
//! failed fetches only bump the error count.

use crate::crawler::FetchResult;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Final crawl statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStats {
    /// Fetches that produced an HTTP response (any status)
    pub success: u64,

    /// Fetches that failed before or while reading the response
    pub errors: u64,

    /// Lowest total latency, zero if nothing succeeded
    pub fastest: Duration,

    /// Highest total latency, zero if nothing succeeded
    pub slowest: Duration,

    /// Middle sample of the latencies in arrival order
    pub mean: Duration,

    /// Running arithmetic mean of the latencies
    pub average: Duration,

    /// Responses per status code
    pub status_codes: BTreeMap<u16, u64>,
}

impl fmt::Display for CrawlStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Success:  {}", self.success)?;
        writeln!(f, "Errors:   {}", self.errors)?;
        writeln!(f)?;
        writeln!(f, "Fastest:  {:?}", self.fastest)?;
        writeln!(f, "Slowest:  {:?}", self.slowest)?;
        writeln!(f)?;
        writeln!(f, "Mean:     {:?}", self.mean)?;
        writeln!(f, "Average:  {:?}", self.average)?;
        writeln!(f)?;
        writeln!(f, "StatusCodes:")?;
        for (code, count) in &self.status_codes {
            writeln!(f, "\t{:03}: {:<5}", code, count)?;
        }
        Ok(())
    }
}

/// Accumulates statistics while the crawl runs
#[derive(Debug, Clone)]
pub struct StatsCollector {
    success: u64,
    errors: u64,
    fastest: Duration,
    slowest: Duration,
    average_secs: f64,
    timings: Vec<Duration>,
    status_codes: BTreeMap<u16, u64>,
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self {
            success: 0,
            errors: 0,
            fastest: Duration::MAX,
            slowest: Duration::ZERO,
            average_secs: 0.0,
            timings: Vec::new(),
            status_codes: BTreeMap::new(),
        }
    }
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful fetch
    pub fn observe(&mut self, result: &FetchResult) {
        self.record(result.status, result.duration);
    }

    /// Records one response with the given status and total latency
    pub fn record(&mut self, status: u16, latency: Duration) {
        let n = self.success as f64;
        self.average_secs = (self.average_secs * n + latency.as_secs_f64()) / (n + 1.0);
        self.success += 1;

        self.fastest = self.fastest.min(latency);
        self.slowest = self.slowest.max(latency);
        self.timings.push(latency);
        *self.status_codes.entry(status).or_insert(0) += 1;
    }

    /// Records a failed fetch
    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    pub fn success(&self) -> u64 {
        self.success
    }

    pub fn errors(&self) -> u64 {
        self.errors
    }

    /// Produces the final statistics
    pub fn finalize(self) -> CrawlStats {
        let any = !self.timings.is_empty();

        CrawlStats {
            success: self.success,
            errors: self.errors,
            fastest: if any { self.fastest } else { Duration::ZERO },
            slowest: self.slowest,
            mean: middle_sample(&self.timings),
            average: Duration::from_secs_f64(self.average_secs),
            status_codes: self.status_codes,
        }
    }
}

/// Middle of the samples in arrival order
///
/// With an odd count the two samples around the midpoint are averaged, with
/// an even count the sample just past it is taken. The samples are not
/// sorted, so this is a positional figure rather than a true median.
pub fn middle_sample(timings: &[Duration]) -> Duration {
    if timings.is_empty() {
        return Duration::ZERO;
    }

    let middle = timings.len() as f64 / 2.0;
    let index = middle.floor() as usize;

    if index as f64 == middle || timings.len() <= index + 1 {
        timings[index]
    } else {
        (timings[index] + timings[index + 1]) / 2
    }
}
