use crate::output::OutputFormat;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sitewalk
///
/// Every section and every key is optional; missing values take the same
/// defaults as the command line.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetcher: FetcherConfig,
    pub output: OutputConfig,
}

impl Config {
    /// How long a worker waits for work before exiting
    ///
    /// Falls back to the fetch timeout when not set.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(
            self.crawler
                .idle_timeout_secs
                .unwrap_or(self.fetcher.timeout_secs),
        )
    }
}

/// Crawl engine configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CrawlerConfig {
    /// Number of concurrent workers
    pub concurrency: usize,

    /// Maximum number of discovered URLs to enqueue (0 = unbounded)
    pub max_urls: usize,

    /// Worker idle timeout in seconds
    #[serde(rename = "idle-timeout")]
    pub idle_timeout_secs: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            max_urls: 0,
            idle_timeout_secs: None,
        }
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct FetcherConfig {
    /// Per-request timeout in seconds
    #[serde(rename = "timeout")]
    pub timeout_secs: u64,

    /// User-Agent header; reqwest sends none when unset
    pub user_agent: Option<String>,

    /// Only follow links to the host of the page they were found on
    pub same_host: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            user_agent: None,
            same_host: true,
        }
    }
}

/// Record output configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct OutputConfig {
    /// Record serialization format
    pub format: OutputFormat,

    /// Field names, in output order
    pub fields: Vec<String>,

    /// Placeholder for missing values
    pub fallback: String,

    /// Only emit records with a status of 400 or above
    pub broken_only: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Tab,
            fields: ["status", "duration", "path", "query"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            fallback: "-".to_string(),
            broken_only: false,
        }
    }
}
