// SPDX-License-Identifier: Apache-2.0

//! One capture cycle: tail, then optionally reformat and push.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::exporters::file::BatchConfig;
use crate::exporters::sink::{Sink, SinkError};
use crate::receivers::file::persistence::{OffsetStore, PropertiesFileStore};
use crate::receivers::file::{self, LogTail, NameTemplate};
use crate::topology::reformat::{ReformatError, ReformatStats, Reformatter};

/// What a cycle does after tailing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkerKind {
    /// Tail only; the extract is the product
    TailOnly,
    /// Tail, rewrite the extract as a batch file, hand the batch to the sink
    #[default]
    TailFormatPush,
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerKind::TailOnly => f.write_str("tail-only"),
            WorkerKind::TailFormatPush => f.write_str("tail-format-push"),
        }
    }
}

/// Everything one cycle needs to know, fixed at startup
#[derive(Debug, Clone)]
pub struct CaptureJob {
    /// Log file being tailed
    pub source: PathBuf,
    /// Name template for the extract
    pub extract: NameTemplate,
    /// Batch file, rewritten every cycle
    pub batch: PathBuf,
    pub batch_config: BatchConfig,
}

/// Result of a cycle that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The source has not changed size
    NoGrowth,
    Tailed {
        extract: PathBuf,
    },
    Shipped {
        extract: PathBuf,
        batch: PathBuf,
        stats: ReformatStats,
    },
}

/// A failed cycle. Nothing after the failing step ran.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("tail failed: {0}")]
    Tail(#[from] file::Error),

    #[error("batch failed: {0}")]
    Batch(#[from] ReformatError),

    #[error("sink failed: {0}")]
    Sink(#[from] SinkError),
}

/// Runs capture cycles
pub struct CaptureWorker<S: Sink, O: OffsetStore = PropertiesFileStore> {
    kind: WorkerKind,
    tail: LogTail<O>,
    reformatter: Reformatter,
    sink: S,
}

impl<S: Sink, O: OffsetStore> CaptureWorker<S, O> {
    pub fn new(kind: WorkerKind, tail: LogTail<O>, reformatter: Reformatter, sink: S) -> Self {
        Self {
            kind,
            tail,
            reformatter,
            sink,
        }
    }

    pub fn kind(&self) -> WorkerKind {
        self.kind
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run one cycle.
    pub async fn execute(&self, job: &CaptureJob) -> Result<CycleOutcome, CycleError> {
        let Some(extract) = self.tail.tail(&job.source, &job.extract)? else {
            debug!(source = %job.source.display(), "No growth");
            return Ok(CycleOutcome::NoGrowth);
        };

        if self.kind == WorkerKind::TailOnly {
            return Ok(CycleOutcome::Tailed { extract });
        }

        info!(
            extract = %extract.display(),
            batch = %job.batch.display(),
            "Reformatting extract"
        );
        // Only the first batch of a stream carries the heading
        let heading = is_fresh(&job.batch);
        let stats = self
            .reformatter
            .write_batch(&extract, &job.batch, &job.batch_config, heading)?;

        debug!(batch = %job.batch.display(), "Pushing batch");
        self.sink.push(&job.batch).await?;

        Ok(CycleOutcome::Shipped {
            extract,
            batch: job.batch.clone(),
            stats,
        })
    }
}

/// A batch file that is missing or empty starts a new stream.
fn is_fresh(batch: &Path) -> bool {
    fs::metadata(batch).map(|m| m.len() == 0).unwrap_or(true)
}
