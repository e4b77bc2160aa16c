//! JSON lines record output

use crate::output::traits::{OutputResult, RecordSink};
use serde_json::{Map, Value};
use std::io::Write;

/// Writes one JSON object per record, keyed by field name
pub struct JsonSink<W: Write> {
    out: W,
    keys: Vec<String>,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W, keys: &[String]) -> Self {
        Self {
            out,
            keys: keys.to_vec(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for JsonSink<W> {
    fn write(&mut self, fields: &[String]) -> OutputResult<()> {
        let object: Map<String, Value> = self
            .keys
            .iter()
            .cloned()
            .zip(fields.iter().cloned().map(Value::String))
            .collect();

        serde_json::to_writer(&mut self.out, &object)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}
