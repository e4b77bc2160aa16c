//! CSV record output
//!
//! The header row is written lazily, right before the first record, so a
//! crawl that produces nothing produces an empty file.

use crate::output::traits::{OutputResult, RecordSink};
use std::io::Write;

pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    header: Vec<String>,
    header_written: bool,
}

impl<W: Write> CsvSink<W> {
    /// Creates a sink whose header row is `header`
    pub fn new(out: W, header: &[String]) -> Self {
        Self {
            writer: csv::WriterBuilder::new().flexible(true).from_writer(out),
            header: header.to_vec(),
            header_written: false,
        }
    }

    pub fn into_inner(self) -> OutputResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| e.into_error().into())
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn write(&mut self, fields: &[String]) -> OutputResult<()> {
        if !self.header_written {
            self.writer.write_record(&self.header)?;
            self.header_written = true;
        }
        self.writer.write_record(fields)?;
        self.writer.flush()?;
        Ok(())
    }
}
