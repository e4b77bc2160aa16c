//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end with the real HTTP fetcher.

use sitewalk::config::FetcherConfig;
use sitewalk::crawler::{crawl, CrawlBudget, CrawlReport, CrawlSettings, Fetcher};
use sitewalk::output::{FieldSelector, ResultWriter};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Outcome {
    report: CrawlReport,
    records: Vec<Vec<String>>,
    diagnostics: String,
}

impl Outcome {
    /// Column `index` of every record, sorted
    fn column(&self, index: usize) -> Vec<String> {
        let mut values: Vec<String> = self.records.iter().map(|r| r[index].clone()).collect();
        values.sort();
        values
    }
}

fn fetcher_config() -> FetcherConfig {
    FetcherConfig {
        timeout_secs: 5,
        user_agent: Some("sitewalk-test/1.0".to_string()),
        same_host: true,
    }
}

async fn run_crawl(
    seeds: &[String],
    fields: &[&str],
    budget: CrawlBudget,
    broken_only: bool,
) -> Outcome {
    run_crawl_with(fetcher_config(), seeds, fields, budget, broken_only).await
}

async fn run_crawl_with(
    config: FetcherConfig,
    seeds: &[String],
    fields: &[&str],
    budget: CrawlBudget,
    broken_only: bool,
) -> Outcome {
    let fetcher = Arc::new(Fetcher::from_config(&config).unwrap());
    let selector = FieldSelector::parse(fields, "-").unwrap();
    let mut writer = ResultWriter::new(Vec::new(), selector, Vec::new()).broken_only(broken_only);
    let settings = CrawlSettings {
        concurrency: 4,
        idle_timeout: Duration::from_secs(5),
    };
    let seeds = seeds.iter().map(|s| Url::parse(s).unwrap()).collect();

    let report = crawl(fetcher, seeds, &settings, budget, &mut writer).await;
    let (records, diagnostics) = writer.into_parts();

    Outcome {
        report,
        records,
        diagnostics: String::from_utf8(diagnostics).unwrap(),
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><head></head><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_host() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html(
            r##"<a href="/page1">1</a>
            <a href="/page2#section">2</a>
            <a href="http://other.invalid/away">away</a>
            <a href="#top">top</a>
            <a href="mailto:someone@example.com">mail</a>"##,
        ),
    )
    .await;
    mount_page(&server, "/page1", html(r#"<a href="/">home</a><a href="/page2">2</a>"#)).await;
    mount_page(&server, "/page2", html(r#"<a href="/page1">1</a>"#)).await;

    let seed = format!("{}/", server.uri());
    let outcome = run_crawl(&[seed], &["path", "status"], CrawlBudget::unbounded(), false).await;

    assert_eq!(outcome.column(0), vec!["/", "/page1", "/page2"]);
    assert_eq!(outcome.column(1), vec!["200", "200", "200"]);
    assert_eq!(outcome.report.stats.success, 3);
    assert_eq!(outcome.report.stats.errors, 0);
    assert_eq!(outcome.report.visited.len(), 2);
    assert!(outcome.diagnostics.is_empty());
}

#[tokio::test]
async fn test_redirects_are_reported_not_followed() {
    let server = MockServer::start().await;

    mount_page(&server, "/", html(r#"<a href="/old">old</a>"#)).await;
    mount_page(
        &server,
        "/old",
        ResponseTemplate::new(302).insert_header("location", "/new"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());
    let outcome = run_crawl(&[seed], &["path", "status"], CrawlBudget::unbounded(), false).await;

    assert_eq!(outcome.column(0), vec!["/", "/old"]);
    assert_eq!(outcome.report.stats.status_codes.get(&302), Some(&1));
}

#[tokio::test]
async fn test_client_errors_are_records_not_failures() {
    let server = MockServer::start().await;

    mount_page(&server, "/", html(r#"<a href="/missing">gone</a><a href="/ok">ok</a>"#)).await;
    mount_page(&server, "/missing", ResponseTemplate::new(404)).await;
    mount_page(&server, "/ok", html("")).await;

    let seed = format!("{}/", server.uri());
    let fields = ["path", "status", "origin"];
    let outcome = run_crawl(&[seed], &fields, CrawlBudget::unbounded(), true).await;

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0][0], "/missing");
    assert_eq!(outcome.records[0][1], "404");
    assert_eq!(outcome.records[0][2], format!("{}/", server.uri()));
    assert_eq!(outcome.report.stats.success, 3);
    assert_eq!(outcome.report.stats.errors, 0);
    assert_eq!(outcome.report.stats.status_codes.get(&404), Some(&1));
}

#[tokio::test]
async fn test_sitemap_entries_are_crawled() {
    let server = MockServer::start().await;
    let base = server.uri();

    let sitemap = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{base}/docs</loc></url>
  <url><loc> {base}/blog </loc></url>
  <url><loc>http://other.invalid/skip</loc></url>
</urlset>"#
    );
    mount_page(
        &server,
        "/sitemap.xml",
        ResponseTemplate::new(200)
            .set_body_string(sitemap)
            .insert_header("content-type", "application/xml"),
    )
    .await;
    mount_page(&server, "/docs", html("")).await;
    mount_page(&server, "/blog", html("")).await;

    let seed = format!("{}/sitemap.xml", base);
    let outcome = run_crawl(&[seed], &["path", "nurls"], CrawlBudget::unbounded(), false).await;

    assert_eq!(outcome.column(0), vec!["/blog", "/docs", "/sitemap.xml"]);
    let sitemap_record = outcome
        .records
        .iter()
        .find(|r| r[0] == "/sitemap.xml")
        .unwrap();
    assert_eq!(sitemap_record[1], "2");
}

#[tokio::test]
async fn test_budget_limits_discovered_urls() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html(r#"<a href="/a">a</a><a href="/b">b</a><a href="/c">c</a>"#),
    )
    .await;
    mount_page(&server, "/a", html(r#"<a href="/a/deeper">deeper</a>"#)).await;
    mount_page(&server, "/b", html(r#"<a href="/b/deeper">deeper</a>"#)).await;
    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());
    let outcome = run_crawl(&[seed], &["path"], CrawlBudget::new(2), false).await;

    assert_eq!(outcome.column(0), vec!["/", "/a", "/b"]);
    assert!(outcome.report.cancelled);
    assert_eq!(outcome.report.visited.len(), 2);
}

#[tokio::test]
async fn test_metadata_and_header_fields() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/article",
        ResponseTemplate::new(200)
            .set_body_string(
                r#"<html><head>
                <meta property="og:title" content="Hello">
                <meta name="description" content="A page">
                </head><body></body></html>"#,
            )
            .insert_header("content-type", "text/html")
            .insert_header("x-served-by", "mock"),
    )
    .await;

    let seed = format!("{}/article?id=42&lang=en", server.uri());
    let outcome = run_crawl(
        &[seed],
        &[
            "meta.og:title",
            "meta.description",
            "meta.keywords",
            "header.X-Served-By",
            "query.id",
            "query",
            "origin",
        ],
        CrawlBudget::unbounded(),
        false,
    )
    .await;

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(
        outcome.records[0],
        vec!["Hello", "A page", "-", "mock", "42", "id=42&lang=en", "-"]
    );
}

#[tokio::test]
async fn test_unreachable_seed_is_diagnosed() {
    let seed = "http://127.0.0.1:9/".to_string();
    let outcome = run_crawl(&[seed], &["url"], CrawlBudget::unbounded(), false).await;

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.report.stats.errors, 1);
    assert_eq!(outcome.report.stats.success, 0);
    assert!(outcome.diagnostics.starts_with("http://127.0.0.1:9/ "));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;

    mount_page(&server, "/", html(r#"<a href="/slow">slow</a>"#)).await;
    mount_page(&server, "/slow", html("").set_delay(Duration::from_secs(3))).await;

    let config = FetcherConfig {
        timeout_secs: 1,
        ..fetcher_config()
    };
    let seed = format!("{}/", server.uri());
    let outcome = run_crawl_with(config, &[seed], &["path"], CrawlBudget::unbounded(), false).await;

    assert_eq!(outcome.column(0), vec!["/"]);
    assert_eq!(outcome.report.stats.success, 1);
    assert_eq!(outcome.report.stats.errors, 1);
    assert!(
        outcome
            .diagnostics
            .starts_with(&format!("{}/slow request timeout:", server.uri())),
        "unexpected diagnostics: {}",
        outcome.diagnostics
    );
}
