// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use tracing::info;

use crate::exporters::sink::{Sink, SinkError};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Copies each artifact into a spool directory under a timestamped name.
///
/// `hrtrtf.csv` pushed at 07:04:42 on 2012-02-15 becomes
/// `hrtrtf_20120215_070442.csv`. A name already taken gets a numeric suffix.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn push_at<Tz: TimeZone>(
        &self,
        artifact: &Path,
        now: &DateTime<Tz>,
    ) -> Result<PathBuf, SinkError>
    where
        Tz::Offset: std::fmt::Display,
    {
        let deliver_err = |source| SinkError::Deliver {
            path: artifact.to_path_buf(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(deliver_err)?;

        let stamp = now.format(TIMESTAMP_FORMAT).to_string();
        let mut dest = self.dir.join(spooled_name(artifact, &stamp, 0));
        let mut attempt = 0;
        while tokio::fs::try_exists(&dest).await.map_err(deliver_err)? {
            attempt += 1;
            dest = self.dir.join(spooled_name(artifact, &stamp, attempt));
        }

        tokio::fs::copy(artifact, &dest)
            .await
            .map_err(|source| SinkError::Read {
                path: artifact.to_path_buf(),
                source,
            })?;

        info!(
            path = %artifact.display(),
            dest = %dest.display(),
            "Spooled batch"
        );
        Ok(dest)
    }
}

impl Sink for DirectorySink {
    async fn push(&self, artifact: &Path) -> Result<(), SinkError> {
        self.push_at(artifact, &Local::now()).await.map(|_| ())
    }
}

fn spooled_name(artifact: &Path, stamp: &str, attempt: u32) -> String {
    let stem = artifact
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "batch".to_string());
    let ext = artifact
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    if attempt == 0 {
        format!("{}_{}{}", stem, stamp, ext)
    } else {
        format!("{}_{}_{}{}", stem, stamp, attempt, ext)
    }
}
