// SPDX-License-Identifier: Apache-2.0

//! File receiver for incrementally shipping growing log files.
//!
//! Each cycle reads only the bytes appended to a source file since the previous
//! cycle, writes them verbatim to an extract artifact, and records how far the
//! source has been consumed so that the next cycle (possibly in a new process)
//! resumes from the same point.
//!
//! Features:
//! - Offset and sequence persistence in a properties-style history file
//! - Truncation / rotation detection with sequence reset
//! - Per-cycle read cap with lossy catch-up under backlog
//! - Vehicle location log parser producing column-normalized records

pub mod config;
pub mod entry;
pub mod error;
pub mod parser;
pub mod persistence;
pub mod tail;
pub mod template;

pub use config::{SizeLimit, TailConfig};
pub use entry::{Column, NormalizedRecord, RecordKind};
pub use error::{Error, Result};
pub use parser::{InvalidLine, Parser, VehicleLogParser};
pub use persistence::{OffsetStore, PropertiesFileStore, TailState, TailStates};
pub use tail::{ExtractBatch, LogTail};
pub use template::NameTemplate;
