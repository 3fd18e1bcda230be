// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::exporters::file::{FileExporterError, RecordWriter, Result};
use crate::receivers::file::entry::{Column, NormalizedRecord};

/// Writes each record as a JSON object on its own line, keyed by heading.
///
/// Only populated columns are written.
pub struct JsonLinesWriter<W: Write> {
    out: W,
    columns: Vec<Column>,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(out: W, columns: Vec<Column>) -> Self {
        Self { out, columns }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

struct JsonRow<'a> {
    columns: &'a [Column],
    record: &'a NormalizedRecord,
}

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for column in self.columns {
            if let Some(value) = self.record.get(*column) {
                map.serialize_entry(column.as_str(), value)?;
            }
        }
        map.end()
    }
}

impl<W: Write> RecordWriter for JsonLinesWriter<W> {
    fn write_heading(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_record(&mut self, record: &NormalizedRecord) -> Result<()> {
        let row = JsonRow {
            columns: &self.columns,
            record,
        };
        serde_json::to_writer(&mut self.out, &row)
            .map_err(|e| FileExporterError::Export(format!("Failed to write JSON: {}", e)))?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
