// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, TimeZone};
use clap::{Args, ValueEnum};
use serde::Deserialize;
use tower::BoxError;

use crate::exporters::file::BatchConfig;
use crate::init::batch_output::BatchOutputArgs;
use crate::init::parse;
use crate::init::sink::SinkArgs;
use crate::receivers::file::config::{DEFAULT_OFFSETS_PATH, DEFAULT_SIZE_LIMIT};
use crate::receivers::file::{NameTemplate, SizeLimit, TailConfig};
use crate::topology::schedule::Schedule;
use crate::topology::worker::{CaptureJob, WorkerKind};

/// Where offsets are remembered and how much a cycle may read
#[derive(Debug, Args, Clone)]
pub struct TailArgs {
    /// History file holding offsets and sequence numbers
    #[arg(
        long,
        env = "LOGCAPTURE_OFFSETS_PATH",
        default_value = DEFAULT_OFFSETS_PATH,
        value_parser = parse::parse_path
    )]
    pub offsets_path: PathBuf,

    /// Most bytes read per cycle: digits, optionally followed by k or m
    #[arg(
        long,
        env = "LOGCAPTURE_SIZE_LIMIT",
        default_value = DEFAULT_SIZE_LIMIT,
        value_parser = parse::parse_size_limit
    )]
    pub size_limit: SizeLimit,
}

impl From<&TailArgs> for TailConfig {
    fn from(args: &TailArgs) -> Self {
        TailConfig::new(args.offsets_path.clone(), args.size_limit)
    }
}

#[derive(Debug, Args, Clone)]
pub struct TailRun {
    /// Extract name template; {0} is the sequence, {1} the hour, {2} the minute
    #[arg(
        short,
        long,
        env = "LOGCAPTURE_EXTRACT",
        default_value = "hrtrtf.txt",
        value_parser = parse::parse_name_template
    )]
    pub output: NameTemplate,

    /// Log file to tail
    pub source: PathBuf,

    #[command(flatten)]
    pub tail: TailArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ReformatRun {
    /// Batch file the records are appended to
    #[arg(
        short,
        long,
        env = "LOGCAPTURE_BATCH",
        default_value = "hrtrtf.csv",
        value_parser = parse::parse_path
    )]
    pub output: PathBuf,

    /// Extract files to reformat, in order
    #[arg(required = true)]
    pub extracts: Vec<PathBuf>,

    /// Year given to dates, which carry none; defaults to the current year
    #[arg(long, env = "LOGCAPTURE_YEAR")]
    pub year: Option<i32>,

    #[command(flatten)]
    pub batch_output: BatchOutputArgs,
}

/// What a capture cycle does after tailing
#[derive(Copy, Clone, Debug, Default, ValueEnum, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum WorkerArg {
    /// Only write the extract
    TailOnly,
    /// Write the extract, reformat it into the batch file, push the batch
    #[default]
    TailFormatPush,
}

impl From<WorkerArg> for WorkerKind {
    fn from(w: WorkerArg) -> Self {
        match w {
            WorkerArg::TailOnly => WorkerKind::TailOnly,
            WorkerArg::TailFormatPush => WorkerKind::TailFormatPush,
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct CaptureRun {
    /// Run a single cycle now instead of cycling
    #[arg(long, env = "LOGCAPTURE_ONCE")]
    pub once: bool,

    /// Time between cycles (e.g., "60s")
    #[arg(
        long,
        env = "LOGCAPTURE_INTERVAL",
        default_value = "60s",
        value_parser = humantime::parse_duration
    )]
    pub interval: Duration,

    /// Work done each cycle
    #[arg(value_enum, long, env = "LOGCAPTURE_WORKER", default_value = "tail-format-push")]
    pub worker: WorkerArg,

    /// Extract name template; {0} is the sequence, {1} the hour, {2} the minute
    #[arg(
        short = 'x',
        long,
        env = "LOGCAPTURE_EXTRACT",
        default_value = "hrtrtf.txt",
        value_parser = parse::parse_name_template
    )]
    pub extract: NameTemplate,

    /// Batch file, rewritten each cycle
    #[arg(
        short = 'o',
        long,
        env = "LOGCAPTURE_BATCH",
        default_value = "hrtrtf.csv",
        value_parser = parse::parse_path
    )]
    pub batch: PathBuf,

    /// Log file to capture
    pub source: PathBuf,

    #[command(flatten)]
    pub tail: TailArgs,

    #[command(flatten)]
    pub batch_output: BatchOutputArgs,

    #[command(flatten)]
    pub sink: SinkArgs,
}

impl CaptureRun {
    /// The fixed description of every cycle
    pub fn job(&self) -> CaptureJob {
        CaptureJob {
            source: self.source.clone(),
            extract: self.extract.clone(),
            batch: self.batch.clone(),
            batch_config: BatchConfig::from(&self.batch_output),
        }
    }

    pub fn schedule<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<Schedule, BoxError> {
        if self.once {
            return Ok(Schedule::Once);
        }
        if self.interval.is_zero() {
            return Err("interval must be positive".into());
        }
        Ok(Schedule::aligned(self.interval, now))
    }
}
