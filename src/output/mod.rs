//! Output module for crawl records and statistics
//!
//! This module handles:
//! - Rendering selected fields of every fetched page
//! - Serializing records as tab separated text, CSV or JSON lines
//! - Accumulating and printing crawl statistics

mod csv_output;
mod fields;
mod json_output;
pub mod stats;
mod tab_output;
mod traits;

pub use csv_output::CsvSink;
pub use fields::{split_field_list, Field, FieldSelector};
pub use json_output::JsonSink;
pub use stats::{CrawlStats, StatsCollector};
pub use tab_output::TabSink;
pub use traits::{OutputError, OutputFormat, OutputResult, RecordSink};

use crate::crawler::FetchResult;
use std::io::Write;

/// Builds the sink for `format` on top of `out`
///
/// # Arguments
///
/// * `format` - Serialization format
/// * `out` - Destination for the records
/// * `names` - Field names, used as CSV header and JSON keys
pub fn build_sink<W>(format: OutputFormat, out: W, names: &[String]) -> Box<dyn RecordSink + Send>
where
    W: Write + Send + 'static,
{
    match format {
        OutputFormat::Tab => Box::new(TabSink::new(out)),
        OutputFormat::Csv => Box::new(CsvSink::new(out, names)),
        OutputFormat::Json => Box::new(JsonSink::new(out, names)),
    }
}

/// Routes fetch results to a record sink and failures to a diagnostics stream
pub struct ResultWriter<S, D> {
    sink: S,
    selector: FieldSelector,
    diagnostics: D,
    broken_only: bool,
}

impl<S: RecordSink, D: Write> ResultWriter<S, D> {
    pub fn new(sink: S, selector: FieldSelector, diagnostics: D) -> Self {
        Self {
            sink,
            selector,
            diagnostics,
            broken_only: false,
        }
    }

    /// Only emit records for responses with a status of 400 or above
    pub fn broken_only(mut self, broken_only: bool) -> Self {
        self.broken_only = broken_only;
        self
    }

    /// Emits the record for a successful fetch
    pub fn record(&mut self, result: &FetchResult) {
        if self.broken_only && !result.is_broken() {
            return;
        }

        let fields = self.selector.render(result);
        if let Err(e) = self.sink.write(&fields) {
            tracing::warn!("Failed to write record for {}: {}", result.url, e);
        }
    }

    /// Emits the diagnostic line for a failed fetch
    pub fn diagnose(&mut self, result: &FetchResult) {
        let Some(error) = &result.error else {
            return;
        };

        if let Err(e) = writeln!(self.diagnostics, "{} {}", result.url, error) {
            tracing::warn!("Failed to write diagnostic for {}: {}", result.url, e);
        }
    }

    pub fn into_parts(self) -> (S, D) {
        (self.sink, self.diagnostics)
    }
}
