//! In-memory site used to drive the crawl engine in unit tests

use crate::crawler::{Fetch, FetchError, FetchResult, Task};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
struct Page {
    status: u16,
    links: Vec<Url>,
    error: Option<String>,
    latency: Duration,
}

/// A fake site: a map from URL to canned response
#[derive(Debug, Default)]
pub(crate) struct StaticSite {
    pages: HashMap<String, Page>,
    fetched: Mutex<Vec<String>>,
    delay: Duration,
}

impl StaticSite {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a page answering `status` and linking to `links`
    pub(crate) fn page(self, url: &str, status: u16, links: &[&str]) -> Self {
        self.timed_page(url, status, links, Duration::from_millis(10))
    }

    /// Adds a page whose reported total latency is `latency`
    pub(crate) fn timed_page(
        mut self,
        url: &str,
        status: u16,
        links: &[&str],
        latency: Duration,
    ) -> Self {
        let links = links
            .iter()
            .map(|l| Url::parse(l).expect("test link must be absolute"))
            .collect();
        self.pages.insert(
            url.to_string(),
            Page {
                status,
                links,
                error: None,
                latency,
            },
        );
        self
    }

    /// Adds a URL whose fetch fails with a transport error
    pub(crate) fn failing(mut self, url: &str, message: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            Page {
                status: 0,
                links: Vec::new(),
                error: Some(message.to_string()),
                latency: Duration::ZERO,
            },
        );
        self
    }

    /// Makes every fetch take `delay` of (tokio) time
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// URLs fetched so far, in fetch order
    pub(crate) fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl Fetch for StaticSite {
    fn fetch(&self, task: Task) -> impl Future<Output = FetchResult> + Send {
        async move {
            self.fetched.lock().unwrap().push(task.to.to_string());

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let mut result = FetchResult::new(task.to, task.from);
            match self.pages.get(result.url.as_str()).cloned() {
                Some(Page {
                    error: Some(message),
                    ..
                }) => {
                    result.error = Some(FetchError::Transport(message));
                }
                Some(page) => {
                    result.status = page.status;
                    result.urls = page.links;
                    result.head = page.latency / 2;
                    result.duration = page.latency;
                }
                None => {
                    result.status = 404;
                    result.duration = Duration::from_millis(1);
                }
            }
            result
        }
    }
}
