// SPDX-License-Identifier: Apache-2.0

//! Turns tail extracts into batch files.
//!
//! An extract is read line by line; every line goes through the parser and
//! either becomes a record or is skipped. A bad line never stops the batch.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader};
use std::ops::AddAssign;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::exporters::file::{BatchConfig, BatchWriter, FileExporterError, RecordWriter};
use crate::receivers::file::entry::NormalizedRecord;
use crate::receivers::file::parser::{Parser, VehicleLogParser};

#[derive(Debug, Error)]
pub enum ReformatError {
    #[error("failed to open extract {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read extract {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write batch {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: FileExporterError,
    },
}

pub type Result<T> = std::result::Result<T, ReformatError>;

/// Line counts for one or more extracts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReformatStats {
    pub lines: u64,
    pub accepted: u64,
    /// Well formed lines of a kind that produces no record
    pub filtered: u64,
    pub rejected: u64,
}

impl AddAssign for ReformatStats {
    fn add_assign(&mut self, other: Self) {
        self.lines += other.lines;
        self.accepted += other.accepted;
        self.filtered += other.filtered;
        self.rejected += other.rejected;
    }
}

/// Records parsed lazily from a reader.
///
/// Invalid lines are logged and skipped. Lines that are not UTF-8 are decoded
/// lossily first.
pub struct Records<'a, P: Parser, R: BufRead> {
    parser: &'a P,
    reader: R,
    buf: Vec<u8>,
    stats: ReformatStats,
}

impl<'a, P: Parser, R: BufRead> Records<'a, P, R> {
    pub fn new(parser: &'a P, reader: R) -> Self {
        Self {
            parser,
            reader,
            buf: Vec::new(),
            stats: ReformatStats::default(),
        }
    }

    /// Counts for the lines consumed so far
    pub fn stats(&self) -> ReformatStats {
        self.stats
    }
}

impl<P: Parser, R: BufRead> Iterator for Records<'_, P, R> {
    type Item = io::Result<NormalizedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }

            self.stats.lines += 1;
            let text = String::from_utf8_lossy(&self.buf);
            let line = text.trim_end_matches(['\n', '\r']);

            match self.parser.parse(line) {
                Ok(Some(record)) => {
                    self.stats.accepted += 1;
                    return Some(Ok(record));
                }
                Ok(None) => {
                    self.stats.filtered += 1;
                }
                Err(e) => {
                    self.stats.rejected += 1;
                    warn!(line = self.stats.lines, error = %e, "Skipping invalid line");
                }
            }
        }
    }
}

/// Parses extracts and writes their records to batch writers
pub struct Reformatter<P: Parser = VehicleLogParser> {
    parser: P,
}

impl Default for Reformatter<VehicleLogParser> {
    fn default() -> Self {
        Self::new(VehicleLogParser::new())
    }
}

impl<P: Parser> Reformatter<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Lazily parse one extract file.
    pub fn process(&self, extract: &Path) -> Result<Records<'_, P, BufReader<File>>> {
        let file = File::open(extract).map_err(|source| ReformatError::Open {
            path: extract.to_path_buf(),
            source,
        })?;
        Ok(Records::new(&self.parser, BufReader::new(file)))
    }

    /// Write every record of `extract` to `writer`.
    ///
    /// `heading` decides whether the writer's heading row is written first; the
    /// caller knows whether the destination is a fresh stream.
    pub fn reformat_into<W: RecordWriter>(
        &self,
        extract: &Path,
        writer: &mut W,
        heading: bool,
        destination: &Path,
    ) -> Result<ReformatStats> {
        let write_err = |source| ReformatError::Write {
            path: destination.to_path_buf(),
            source,
        };

        if heading {
            writer.write_heading().map_err(write_err)?;
        }

        let mut records = self.process(extract)?;
        for record in records.by_ref() {
            let record = record.map_err(|source| ReformatError::Read {
                path: extract.to_path_buf(),
                source,
            })?;
            writer.write_record(&record).map_err(write_err)?;
        }
        writer.flush().map_err(write_err)?;

        let stats = records.stats();
        info!(
            extract = %extract.display(),
            lines = stats.lines,
            accepted = stats.accepted,
            filtered = stats.filtered,
            rejected = stats.rejected,
            "Reformatted extract"
        );
        Ok(stats)
    }

    /// Replace `batch` with the records of `extract`, led by the heading row
    /// when `heading` is set.
    pub fn write_batch(
        &self,
        extract: &Path,
        batch: &Path,
        config: &BatchConfig,
        heading: bool,
    ) -> Result<ReformatStats> {
        let file = File::create(batch).map_err(|e| ReformatError::Write {
            path: batch.to_path_buf(),
            source: e.into(),
        })?;
        let mut writer = BatchWriter::from_config(config, io::BufWriter::new(file));
        self.reformat_into(extract, &mut writer, heading, batch)
    }

    /// Append the records of each extract to `output`.
    ///
    /// The heading is written only when `output` is missing or empty.
    pub fn append_batch(
        &self,
        extracts: &[PathBuf],
        output: &Path,
        config: &BatchConfig,
    ) -> Result<ReformatStats> {
        let open_err = |e: io::Error| ReformatError::Write {
            path: output.to_path_buf(),
            source: e.into(),
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(output)
            .map_err(open_err)?;
        let fresh = file.metadata().map_err(open_err)?.len() == 0;
        debug!(output = %output.display(), fresh, "Appending to batch");

        let mut writer = BatchWriter::from_config(config, io::BufWriter::new(file));
        let mut total = ReformatStats::default();
        for (i, extract) in extracts.iter().enumerate() {
            total += self.reformat_into(extract, &mut writer, fresh && i == 0, output)?;
        }
        Ok(total)
    }
}
