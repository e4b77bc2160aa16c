//! Document parser for extracting links and metadata
//!
//! This module handles parsing a fetched body to extract:
//! - Links to follow (from `<a href>` tags, or `<loc>` entries of a sitemap)
//! - `<head><meta>` metadata keyed by `property` or `name`

use crate::url::{normalize, LinkFilter};
use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};
use url::Url;

/// Extracted information from a fetched document
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Crawl candidates in extraction order (absolute, filtered)
    pub urls: Vec<Url>,

    /// Meta tags keyed by `property`, falling back to `name`
    pub meta: HashMap<String, String>,
}

/// Parses a document body and extracts crawl candidates and metadata
///
/// # Extraction Rules
///
/// **Sitemap:** when the base path ends in `.xml` and the document contains
/// `urlset > url > loc` entries, every `<loc>` is a candidate and nothing else
/// is extracted (metadata stays empty).
///
/// **Page:** every `<a href>` is normalized against `base`; duplicates within
/// the page collapse and the first occurrence keeps its position. Every
/// `<head><meta>` with a `property` or `name` attribute is captured with its
/// `content` (empty when absent).
///
/// # Arguments
///
/// * `body` - The document content
/// * `base` - The URL the document was fetched from
/// * `filter` - Predicate applied to every normalized candidate
///
/// # Example
///
/// ```
/// use sitewalk::crawler::parse_document;
/// use sitewalk::url::same_host;
/// use url::Url;
///
/// let html = r#"<html><head><meta property="og:title" content="Hi"></head>
///     <body><a href="/a">A</a><a href="https://other.com/">B</a></body></html>"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// let page = parse_document(html, &base, &same_host);
/// assert_eq!(page.urls.len(), 1);
/// assert_eq!(page.meta["og:title"], "Hi");
/// ```
pub fn parse_document(body: &str, base: &Url, filter: &dyn LinkFilter) -> ParsedPage {
    let document = Html::parse_document(body);

    if base.path().ends_with(".xml") {
        if let Some(urls) = extract_sitemap(&document, base, filter) {
            return ParsedPage {
                urls,
                meta: HashMap::new(),
            };
        }
    }

    ParsedPage {
        urls: extract_links(&document, base, filter),
        meta: extract_meta(&document),
    }
}

/// Returns the sitemap entries, or None if the document is not a sitemap
fn extract_sitemap(document: &Html, base: &Url, filter: &dyn LinkFilter) -> Option<Vec<Url>> {
    let loc_selector = Selector::parse("urlset > url > loc").ok()?;

    let mut locs = document.select(&loc_selector).peekable();
    locs.peek()?;

    let urls = locs
        .filter_map(|element| {
            let text = element.text().collect::<String>();
            normalize(base, text.trim(), filter)
                .map_err(|e| tracing::trace!("Skipping sitemap entry on {}: {}", base, e))
                .ok()
        })
        .collect();

    Some(urls)
}

/// Extracts every followable anchor, deduplicated in first-seen order
fn extract_links(document: &Html, base: &Url, filter: &dyn LinkFilter) -> Vec<Url> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            match normalize(base, href, filter) {
                Ok(url) => {
                    if seen.insert(url.to_string()) {
                        links.push(url);
                    }
                }
                Err(e) => tracing::trace!("Skipping link on {}: {}", base, e),
            }
        }
    }

    links
}

/// Extracts `<head><meta>` tags keyed by `property`, falling back to `name`
fn extract_meta(document: &Html) -> HashMap<String, String> {
    let mut meta = HashMap::new();

    if let Ok(meta_selector) = Selector::parse("head meta") {
        for element in document.select(&meta_selector) {
            let attrs = element.value();
            let Some(key) = attrs.attr("property").or_else(|| attrs.attr("name")) else {
                continue;
            };

            let content = attrs.attr("content").unwrap_or_default();
            meta.insert(key.to_string(), content.to_string());
        }
    }

    meta
}
