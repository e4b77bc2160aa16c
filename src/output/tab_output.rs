//! Tab separated record output

use crate::output::traits::{OutputResult, RecordSink};
use std::io::Write;

/// Writes every field followed by a tab, one record per line
pub struct TabSink<W: Write> {
    out: W,
}

impl<W: Write> TabSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for TabSink<W> {
    fn write(&mut self, fields: &[String]) -> OutputResult<()> {
        for field in fields {
            self.out.write_all(field.as_bytes())?;
            self.out.write_all(b"\t")?;
        }
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}
