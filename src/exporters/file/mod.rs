// SPDX-License-Identifier: Apache-2.0

//! Batch file writers for normalized records.
//!
//! - [`CsvWriter`] - comma separated values with a heading row
//! - [`JsonLinesWriter`] - one JSON object per record

pub mod config;
mod csv;
mod json;

pub use config::BatchConfig;
pub use csv::CsvWriter;
pub use json::JsonLinesWriter;

use std::io::Write;

use thiserror::Error;

use crate::init::batch_output::BatchFormat;
use crate::receivers::file::entry::{Column, NormalizedRecord};

/// Errors that can occur while writing a batch file.
///
/// - `Io`: the destination could not be written.
/// - `Export`: a record could not be encoded.
#[derive(Debug, Error)]
pub enum FileExporterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export error: {0}")]
    Export(String),
}

/// Result type for file exporter operations.
pub type Result<T> = std::result::Result<T, FileExporterError>;

/// Writes records into one output stream
pub trait RecordWriter {
    /// Write the heading row, if the format has one.
    fn write_heading(&mut self) -> Result<()>;

    fn write_record(&mut self, record: &NormalizedRecord) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

/// Writer for any configured batch format
pub enum BatchWriter<W: Write> {
    Csv(CsvWriter<W>),
    Json(JsonLinesWriter<W>),
}

impl<W: Write> BatchWriter<W> {
    pub fn new(format: BatchFormat, columns: Vec<Column>, out: W) -> Self {
        match format {
            BatchFormat::Csv => BatchWriter::Csv(CsvWriter::new(out, columns)),
            BatchFormat::Json => BatchWriter::Json(JsonLinesWriter::new(out, columns)),
        }
    }

    pub fn from_config(config: &BatchConfig, out: W) -> Self {
        Self::new(config.format, config.columns.clone(), out)
    }

    pub fn into_inner(self) -> W {
        match self {
            BatchWriter::Csv(w) => w.into_inner(),
            BatchWriter::Json(w) => w.into_inner(),
        }
    }
}

impl<W: Write> RecordWriter for BatchWriter<W> {
    fn write_heading(&mut self) -> Result<()> {
        match self {
            BatchWriter::Csv(w) => w.write_heading(),
            BatchWriter::Json(w) => w.write_heading(),
        }
    }

    fn write_record(&mut self, record: &NormalizedRecord) -> Result<()> {
        match self {
            BatchWriter::Csv(w) => w.write_record(record),
            BatchWriter::Json(w) => w.write_record(record),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self {
            BatchWriter::Csv(w) => w.flush(),
            BatchWriter::Json(w) => w.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receivers::file::entry::RecordKind;

    fn record() -> NormalizedRecord {
        let mut record = NormalizedRecord::new(RecordKind::Location);
        record.insert(Column::Date, "2012-02-15");
        record.insert(Column::Vehicle, "V.1.2233");
        record
    }

    #[test]
    fn test_batch_writer_csv() {
        let mut w = BatchWriter::new(
            BatchFormat::Csv,
            vec![Column::Date, Column::Vehicle],
            Vec::new(),
        );
        w.write_heading().unwrap();
        w.write_record(&record()).unwrap();
        w.flush().unwrap();

        let out = String::from_utf8(w.into_inner()).unwrap();
        assert_eq!(out, "Date,Vehicle\n2012-02-15,V.1.2233\n");
    }

    #[test]
    fn test_batch_writer_json() {
        let mut w = BatchWriter::new(
            BatchFormat::Json,
            vec![Column::Date, Column::Vehicle],
            Vec::new(),
        );
        w.write_heading().unwrap();
        w.write_record(&record()).unwrap();
        w.flush().unwrap();

        let out = String::from_utf8(w.into_inner()).unwrap();
        assert_eq!(out, "{\"Date\":\"2012-02-15\",\"Vehicle\":\"V.1.2233\"}\n");
    }
}
