// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;
use std::io::Write;

use crate::exporters::file::{RecordWriter, Result};
use crate::receivers::file::entry::{Column, NormalizedRecord};

const SEPARATOR: char = ',';
const QUOTE: char = '"';
const LINE_END: &str = "\n";

/// CSV writer over a fixed list of columns.
///
/// Values containing a comma, a quote or a newline are quoted, with inner
/// quotes doubled. Columns a record does not carry are written empty.
pub struct CsvWriter<W: Write> {
    out: W,
    columns: Vec<Column>,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(out: W, columns: Vec<Column>) -> Self {
        Self { out, columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Write one row of raw values.
    pub fn write_row<'a>(&mut self, values: impl IntoIterator<Item = &'a str>) -> Result<()> {
        let mut line = String::new();
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                line.push(SEPARATOR);
            }
            line.push_str(&escape(value));
        }
        line.push_str(LINE_END);
        self.out.write_all(line.as_bytes())?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordWriter for CsvWriter<W> {
    fn write_heading(&mut self) -> Result<()> {
        let headings: Vec<&'static str> = self.columns.iter().map(Column::as_str).collect();
        self.write_row(headings)
    }

    fn write_record(&mut self, record: &NormalizedRecord) -> Result<()> {
        let values: Vec<&str> = self.columns.iter().map(|c| record.value(*c)).collect();
        self.write_row(values)
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Quote a value if it needs it.
pub fn escape(value: &str) -> Cow<'_, str> {
    if !value.contains([SEPARATOR, QUOTE, '\n']) {
        return Cow::Borrowed(value);
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push(QUOTE);
    for c in value.chars() {
        if c == QUOTE {
            quoted.push(QUOTE);
        }
        quoted.push(c);
    }
    quoted.push(QUOTE);
    Cow::Owned(quoted)
}
