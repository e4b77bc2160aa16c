//! Sitewalk main entry point
//!
//! This is the command-line interface for the Sitewalk crawler. Records go to
//! stdout; logs, fetch failures and the final report go to stderr.

use anyhow::Context;
use clap::Parser;
use sitewalk::config::{load_config, parse_seed, validate, Config};
use sitewalk::crawler::{crawl, CrawlBudget, CrawlSettings, Fetcher};
use sitewalk::output::{build_sink, split_field_list, FieldSelector, OutputFormat, ResultWriter};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Sitewalk: a bounded, breadth-first web crawler
///
/// Sitewalk fetches the given URLs, follows the links it finds on them and
/// prints one record per fetched page, followed by latency and status code
/// statistics.
#[derive(Parser, Debug)]
#[command(name = "sitewalk")]
#[command(version)]
#[command(about = "A bounded, breadth-first web crawler", long_about = None)]
struct Cli {
    /// URLs to start crawling from
    #[arg(value_name = "URL", required = true)]
    seeds: Vec<String>,

    /// Number of concurrent workers [default: 8]
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Maximum number of discovered URLs to crawl, 0 for no limit [default: 0]
    #[arg(short = 'n', long = "max")]
    max_urls: Option<usize>,

    /// Per-request timeout in seconds [default: 5]
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Seconds a worker waits for work before exiting [default: the timeout]
    #[arg(long)]
    idle_timeout: Option<u64>,

    /// Comma separated fields to print [default: status,duration,path,query]
    #[arg(short = 'o', long)]
    fields: Option<String>,

    /// Record format [default: tab]
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Placeholder for missing values [default: -]
    #[arg(long)]
    fallback: Option<String>,

    /// User-Agent header to send
    #[arg(long)]
    user_agent: Option<String>,

    /// Follow links to other hosts
    #[arg(long)]
    any_host: bool,

    /// Only print pages answering with a status of 400 or above
    #[arg(long)]
    broken: bool,

    /// Path to a TOML configuration file providing defaults
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Layers the command line flags over `config`
    fn apply_to(&self, config: &mut Config) {
        if let Some(concurrency) = self.concurrency {
            config.crawler.concurrency = concurrency;
        }
        if let Some(max_urls) = self.max_urls {
            config.crawler.max_urls = max_urls;
        }
        if let Some(idle) = self.idle_timeout {
            config.crawler.idle_timeout_secs = Some(idle);
        }
        if let Some(timeout) = self.timeout {
            config.fetcher.timeout_secs = timeout;
        }
        if let Some(agent) = &self.user_agent {
            config.fetcher.user_agent = Some(agent.clone());
        }
        if self.any_host {
            config.fetcher.same_host = false;
        }
        if let Some(fields) = &self.fields {
            config.output.fields = split_field_list(fields);
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(fallback) = &self.fallback {
            config.output.fallback = fallback.clone();
        }
        if self.broken {
            config.output.broken_only = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };
    cli.apply_to(&mut config);
    validate(&config).context("invalid settings")?;

    let seeds = cli
        .seeds
        .iter()
        .map(String::as_str)
        .map(parse_seed)
        .collect::<Result<Vec<Url>, _>>()
        .context("invalid seed URL")?;

    run(config, seeds).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitewalk=info,warn"),
            1 => EnvFilter::new("sitewalk=debug,info"),
            _ => EnvFilter::new("sitewalk=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Stops expansion on the first Ctrl-C and exits on the second
fn spawn_interrupt_handler(budget: CrawlBudget) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::warn!("Unable to listen for Ctrl-C");
            return;
        }
        eprintln!("quitting...");
        tracing::warn!("Interrupted, waiting for fetches in flight (Ctrl-C again to abort)");
        budget.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });
}

/// Handles the main crawl operation
async fn run(config: Config, seeds: Vec<Url>) -> anyhow::Result<()> {
    let selector = FieldSelector::parse(&config.output.fields, &config.output.fallback)?;
    let sink = build_sink(config.output.format, std::io::stdout(), selector.names());
    let mut writer = ResultWriter::new(sink, selector, std::io::stderr())
        .broken_only(config.output.broken_only);

    let fetcher =
        Arc::new(Fetcher::from_config(&config.fetcher).context("failed to build HTTP client")?);

    let budget = CrawlBudget::new(config.crawler.max_urls);
    spawn_interrupt_handler(budget.clone());

    let settings = CrawlSettings::from_config(&config);
    tracing::info!(
        "Crawling {} seed URLs with {} workers (limit: {}, same host only: {})",
        seeds.len(),
        settings.concurrency,
        config.crawler.max_urls,
        config.fetcher.same_host
    );

    let report = crawl(fetcher, seeds, &settings, budget, &mut writer).await;
    if report.cancelled {
        tracing::info!("Stopped expanding after {} URLs", report.visited.len());
    }

    eprint!("{}", report.stats);
    Ok(())
}
