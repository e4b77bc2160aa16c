//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client (no redirect following, per-fetch timeout)
//! - Timing header arrival and full body completion
//! - Parsing the body into discovered links and metadata
//! - Classifying transport and body failures

use crate::config::FetcherConfig;
use crate::crawler::parser::parse_document;
use crate::url::{any_host, same_host, LinkFilter};
use reqwest::header::HeaderMap;
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// One unit of crawl work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// The page the URL was discovered on (None for seeds)
    pub from: Option<Url>,

    /// The URL to fetch
    pub to: Url,
}

impl Task {
    /// Creates a task for a seed URL
    pub fn seed(to: Url) -> Self {
        Self { from: None, to }
    }
}

/// Errors contained in a single fetch result
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS or timeout failure before a response arrived
    #[error("{0}")]
    Transport(String),

    /// The response body could not be read or decoded
    #[error("failed to read body: {0}")]
    Body(String),
}

/// Outcome of fetching one task
#[derive(Debug)]
pub struct FetchResult {
    /// The requested URL
    pub url: Url,

    /// The page the URL was discovered on
    pub origin: Option<Url>,

    /// Time until response headers were available
    pub head: Duration,

    /// Time until the body was read and parsed
    pub duration: Duration,

    /// HTTP status code (0 when no response was received)
    pub status: u16,

    /// Response headers
    pub headers: HeaderMap,

    /// Meta tags keyed by `property` or `name`
    pub meta: HashMap<String, String>,

    /// Crawl candidates found in the body, in extraction order
    pub urls: Vec<Url>,

    /// Set when the fetch failed; nothing else is meaningful then
    pub error: Option<FetchError>,
}

impl FetchResult {
    /// Creates an empty result for `url`, discovered on `origin`
    pub fn new(url: Url, origin: Option<Url>) -> Self {
        Self {
            url,
            origin,
            head: Duration::ZERO,
            duration: Duration::ZERO,
            status: 0,
            headers: HeaderMap::new(),
            meta: HashMap::new(),
            urls: Vec::new(),
            error: None,
        }
    }

    /// Returns true if the fetch failed at the transport or body level
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns true for 4xx and 5xx responses
    pub fn is_broken(&self) -> bool {
        self.status >= 400
    }
}

/// Something that turns a task into exactly one result
///
/// Implementations must never panic on failure; every failure is reported
/// through [`FetchResult::error`].
pub trait Fetch: Send + Sync + 'static {
    /// Fetches `task.to` and returns its result
    fn fetch(&self, task: Task) -> impl Future<Output = FetchResult> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are never followed: the first server reply is the result, so
/// redirect chains show up in the crawl output.
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true);

    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent.as_str());
    }

    builder.build()
}

/// The production fetcher: one GET per task
pub struct Fetcher {
    client: Client,
    filter: Arc<dyn LinkFilter>,
}

impl Fetcher {
    /// Creates a fetcher from configuration and a link filter
    pub fn new(
        config: &FetcherConfig,
        filter: Arc<dyn LinkFilter>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?, filter))
    }

    /// Creates a fetcher whose filter follows `config.same_host`
    pub fn from_config(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        let filter: Arc<dyn LinkFilter> = if config.same_host {
            Arc::new(same_host)
        } else {
            Arc::new(any_host)
        };
        Self::new(config, filter)
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, filter: Arc<dyn LinkFilter>) -> Self {
        Self { client, filter }
    }

    /// Fetches a URL, times it and extracts its links
    ///
    /// # Request Flow
    ///
    /// 1. Send GET; a transport failure ends the fetch with only the error set
    /// 2. Record header latency, status and headers
    /// 3. Read the body; a read failure ends the fetch with a body error
    /// 4. Parse the document, apply the filter, record total latency
    ///
    /// HTTP error statuses are not failures: a 404 page is parsed like any
    /// other.
    pub async fn fetch_url(&self, url: Url, origin: Option<Url>) -> FetchResult {
        let mut result = FetchResult::new(url, origin);
        let start = Instant::now();

        let response = match self.client.get(result.url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Transport error for {}: {}", result.url, e);
                result.error = Some(FetchError::Transport(describe_transport_error(&e)));
                return result;
            }
        };

        result.head = start.elapsed();
        result.status = response.status().as_u16();
        result.headers = response.headers().clone();

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Body error for {}: {}", result.url, e);
                result.error = Some(FetchError::Body(e.to_string()));
                return result;
            }
        };

        let page = parse_document(&body, &result.url, self.filter.as_ref());
        result.urls = page.urls;
        result.meta = page.meta;
        result.duration = start.elapsed();

        tracing::debug!(
            "Fetched {} ({}) with {} links in {:?}",
            result.url,
            result.status,
            result.urls.len(),
            result.duration
        );

        result
    }
}

/// Classifies a transport failure the way it is reported to the user
fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timeout: {}", error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    }
}

impl Fetch for Fetcher {
    fn fetch(&self, task: Task) -> impl Future<Output = FetchResult> + Send {
        self.fetch_url(task.to, task.from)
    }
}
