//! Sitewalk: a bounded, breadth-first web crawler
//!
//! This crate fetches pages concurrently starting from a set of seed URLs,
//! extracts outbound links (and sitemap entries), deduplicates them through a
//! single-consumer frontier and emits one structured record per fetched page
//! while aggregating latency and status statistics.

pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unknown output field: {0}")]
    UnknownField(String),
}

/// Reasons a raw href is rejected as a crawl candidate
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("empty href")]
    Empty,

    #[error("fragment-only href: {0}")]
    Fragment(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("failed to parse URL: {0}")]
    Parse(String),

    #[error("rejected by filter: {0}")]
    Filtered(String),
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlBudget, FetchResult, Fetcher, Task};
pub use output::{CrawlStats, Field};
pub use crate::url::{normalize, same_host, LinkFilter};
