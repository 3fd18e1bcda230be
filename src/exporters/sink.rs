// SPDX-License-Identifier: Apache-2.0

//! Destinations for finished batch files.
//!
//! A sink receives the path of a complete batch artifact and reports whether it
//! accepted it. A rejection fails the capture cycle.

use std::future::Future;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::exporters::blackhole::BlackholeSink;
use crate::exporters::directory::DirectorySink;
use crate::exporters::http::HttpSink;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to read artifact {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to deliver {path}: {source}")]
    Deliver {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} rejected with status {status}")]
    Rejected { path: PathBuf, status: u16 },

    #[error("request for {path} failed: {reason}")]
    Request { path: PathBuf, reason: String },

    #[error("request for {path} timed out")]
    Timeout { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Receives finished batch files
pub trait Sink {
    /// Hand over one artifact. `Ok` means the sink has taken it.
    fn push(&self, artifact: &Path) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// Sink selected at startup
#[derive(Debug)]
pub enum SinkKind {
    Blackhole(BlackholeSink),
    Directory(DirectorySink),
    Http(HttpSink),
}

impl SinkKind {
    pub fn name(&self) -> &'static str {
        match self {
            SinkKind::Blackhole(_) => "blackhole",
            SinkKind::Directory(_) => "directory",
            SinkKind::Http(_) => "http",
        }
    }
}

impl Sink for SinkKind {
    async fn push(&self, artifact: &Path) -> Result<(), SinkError> {
        match self {
            SinkKind::Blackhole(s) => s.push(artifact).await,
            SinkKind::Directory(s) => s.push(artifact).await,
            SinkKind::Http(s) => s.push(artifact).await,
        }
    }
}
