// SPDX-License-Identifier: Apache-2.0

//! Incremental tail of a growing log file.
//!
//! One call to [`LogTail::tail`] is one cycle:
//! 1. load the stored offset and sequence for the source
//! 2. compare the stored offset with the current size of the source
//! 3. read the new bytes (at most the size limit, taken from the end)
//! 4. write them verbatim to the rendered artifact name
//! 5. commit the new offset and sequence
//!
//! State is only committed after the artifact has been written. When the source
//! grew by more than the size limit, only the newest `limit` bytes are emitted
//! and everything before them is skipped for good.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use tracing::{debug, info, warn};

use crate::receivers::file::config::TailConfig;
use crate::receivers::file::error::{Error, Result};
use crate::receivers::file::persistence::{
    OffsetStore, PropertiesFileStore, TailState, TailStates,
};
use crate::receivers::file::template::NameTemplate;

/// Bytes read from a source in one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractBatch {
    pub source_path: String,
    /// Offset of the first byte read
    pub start_offset: u64,
    /// Reader position after the read
    pub end_offset: u64,
    pub sequence: u64,
    pub bytes: Vec<u8>,
}

/// Tails log files, remembering progress in an [`OffsetStore`]
pub struct LogTail<S: OffsetStore = PropertiesFileStore> {
    config: TailConfig,
    store: S,
}

impl LogTail<PropertiesFileStore> {
    /// Tail with offsets kept in the configured history file.
    pub fn new(config: TailConfig) -> Self {
        let store = PropertiesFileStore::new(&config.offsets_path);
        Self { config, store }
    }
}

impl<S: OffsetStore> LogTail<S> {
    pub fn with_store(config: TailConfig, store: S) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &TailConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one tail cycle, naming the artifact from the local wall clock.
    ///
    /// Returns the artifact path, or `None` when the source has not changed size.
    pub fn tail(&self, source: &Path, target: &NameTemplate) -> Result<Option<PathBuf>> {
        self.tail_at(source, target, &Local::now())
    }

    /// Run one tail cycle with an explicit timestamp for the artifact name.
    pub fn tail_at<Tz: TimeZone>(
        &self,
        source: &Path,
        target: &NameTemplate,
        now: &DateTime<Tz>,
    ) -> Result<Option<PathBuf>> {
        let mut states = self.store.load();

        let Some(batch) = self.read_new(source, &states)? else {
            return Ok(None);
        };

        let artifact = target.render(batch.sequence, now);
        fs::write(&artifact, &batch.bytes).map_err(|e| Error::ArtifactWrite {
            path: artifact.clone(),
            source: e,
        })?;

        states.insert(TailState::new(
            batch.source_path.clone(),
            batch.end_offset,
            batch.sequence,
        ));
        self.store.save(&states)?;

        info!(
            source = %batch.source_path,
            artifact = %artifact.display(),
            sequence = batch.sequence,
            offset = batch.end_offset,
            bytes = batch.bytes.len(),
            "Tailed source"
        );

        Ok(Some(artifact))
    }

    /// Read whatever the source gained since the stored offset.
    fn read_new(&self, source: &Path, states: &TailStates) -> Result<Option<ExtractBatch>> {
        let source_path = source.to_string_lossy().into_owned();
        let previous = states.get(&source_path);

        let unavailable = |e| Error::SourceUnavailable {
            path: source.to_path_buf(),
            source: e,
        };

        let mut file = File::open(source).map_err(unavailable)?;
        let current_size = file.metadata().map_err(unavailable)?.len();

        debug!(
            source = %source_path,
            sequence = previous.sequence,
            offset = previous.offset,
            size = current_size,
            "Checking source"
        );

        if current_size == previous.offset {
            debug!(source = %source_path, "Source unchanged");
            return Ok(None);
        }

        let (start, sequence) = if current_size < previous.offset {
            info!(
                source = %source_path,
                offset = previous.offset,
                size = current_size,
                "Source truncated, reading from the start"
            );
            (0, 0)
        } else {
            (previous.offset, previous.sequence + 1)
        };

        let limit = self.config.size_limit.bytes();
        let start = if current_size - start > limit {
            let window_start = current_size - limit;
            warn!(
                source = %source_path,
                skipped = window_start - start,
                limit,
                "Backlog exceeds size limit, skipping to the newest bytes"
            );
            window_start
        } else {
            start
        };

        // Bounded by the size limit
        let len = (current_size - start) as usize;
        let mut bytes = vec![0u8; len];
        file.seek(SeekFrom::Start(start)).map_err(unavailable)?;
        file.read_exact(&mut bytes).map_err(unavailable)?;
        let end_offset = file.stream_position().map_err(unavailable)?;

        Ok(Some(ExtractBatch {
            source_path,
            start_offset: start,
            end_offset,
            sequence,
            bytes,
        }))
    }
}
