//! Output sink traits and types
//!
//! This module defines the trait interface for record sinks and the
//! associated error type.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A destination for per-page records
///
/// The crawl hands every record over as an ordered list of rendered fields;
/// how they are serialized is entirely up to the sink.
pub trait RecordSink {
    /// Writes one record
    fn write(&mut self, fields: &[String]) -> OutputResult<()>;
}

impl<T: RecordSink + ?Sized> RecordSink for Box<T> {
    fn write(&mut self, fields: &[String]) -> OutputResult<()> {
        (**self).write(fields)
    }
}

/// Collects records in memory
impl RecordSink for Vec<Vec<String>> {
    fn write(&mut self, fields: &[String]) -> OutputResult<()> {
        self.push(fields.to_vec());
        Ok(())
    }
}

/// Record serialization formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tab separated fields, one record per line
    #[default]
    Tab,
    /// CSV with a header row
    Csv,
    /// One JSON object per line, keyed by field name
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tab => "tab",
            Self::Csv => "csv",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}
