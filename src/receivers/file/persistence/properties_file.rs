// SPDX-License-Identifier: Apache-2.0

//! Properties file-based offset store with atomic writes.
//!
//! Writes go to a temp file next to the store which is then renamed over it, so
//! a crash mid-write leaves the previous state in place.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, warn};

use crate::receivers::file::error::{Error, Result};
use crate::receivers::file::persistence::properties;
use crate::receivers::file::persistence::schema::{STORE_COMMENT, TailStates};
use crate::receivers::file::persistence::store::OffsetStore;

/// Offset store backed by a single properties file
#[derive(Debug, Clone)]
pub struct PropertiesFileStore {
    path: PathBuf,
}

impl PropertiesFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load states, reporting problems instead of hiding them.
    ///
    /// Returns `Ok(None)` when the store file does not exist.
    pub fn try_load(&self) -> Result<Option<TailStates>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::StoreCorrupt(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        // Properties files are ISO-8859-1; every byte maps to one char.
        let text: String = bytes.iter().map(|&b| b as char).collect();

        let props = properties::parse(&text).map_err(|e| {
            Error::StoreCorrupt(format!("failed to parse {}: {}", self.path.display(), e))
        })?;

        TailStates::from_properties(props).map(Some)
    }
}

impl OffsetStore for PropertiesFileStore {
    fn load(&self) -> TailStates {
        match self.try_load() {
            Ok(Some(states)) => states,
            Ok(None) => {
                debug!(path = %self.path.display(), "No offset history, starting fresh");
                TailStates::new()
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Problems with offset history, treating every source as unseen"
                );
                TailStates::new()
            }
        }
    }

    fn save(&self, states: &TailStates) -> Result<()> {
        atomic_write(&self.path, states)
    }
}

/// Write state to file atomically (write to temp, then rename)
fn atomic_write(path: &Path, states: &TailStates) -> Result<()> {
    use portable_atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Persistence(format!("failed to create parent directory: {}", e))
            })?;
        }
    }

    let unique_id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let temp_path = path.with_extension(format!("tmp.{}.{}", std::process::id(), unique_id));

    let file = File::create(&temp_path)
        .map_err(|e| Error::Persistence(format!("failed to create temp file: {}", e)))?;
    let mut writer = BufWriter::new(file);

    let timestamp = Local::now().format("%a %b %d %H:%M:%S %Z %Y").to_string();
    let written = properties::write(&mut writer, STORE_COMMENT, &timestamp, &states.to_properties())
        .and_then(|_| writer.get_ref().sync_all());
    if let Err(e) = written {
        drop(writer);
        let _ = fs::remove_file(&temp_path);
        return Err(Error::Persistence(format!(
            "failed to write offset store: {}",
            e
        )));
    }
    drop(writer);

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::Persistence(format!("failed to rename offset store: {}", e))
    })?;

    Ok(())
}
