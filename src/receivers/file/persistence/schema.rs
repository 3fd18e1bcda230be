// SPDX-License-Identifier: Apache-2.0

//! Persistence schema for tail state.
//!
//! State is stored as flat properties, two keys per source:
//! - `size.<source path>`: byte offset consumed so far
//! - `seq.<source path>`: sequence number of the last cycle that saw growth
//!
//! A missing key means 0. Keys that match neither prefix are kept as-is so that
//! re-saving a store never drops entries written by something else.

use std::collections::BTreeMap;

use crate::receivers::file::error::{Error, Result};

/// Key prefix for the consumed byte offset
pub const SIZE_KEY_PREFIX: &str = "size.";

/// Key prefix for the sequence number
pub const SEQUENCE_KEY_PREFIX: &str = "seq.";

/// First comment line written to the store file
pub const STORE_COMMENT: &str = "LogTail Cache";

/// Resume point for a single source file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TailState {
    /// Source path exactly as it was given to the tail
    pub source_path: String,
    /// Bytes of the source already consumed
    pub offset: u64,
    /// Sequence number of the most recent cycle that observed growth
    pub sequence: u64,
}

impl TailState {
    pub fn new(source_path: impl Into<String>, offset: u64, sequence: u64) -> Self {
        Self {
            source_path: source_path.into(),
            offset,
            sequence,
        }
    }
}

/// All tail states held by one store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TailStates {
    entries: BTreeMap<String, TailState>,
    /// Unrelated keys carried through untouched
    other: BTreeMap<String, String>,
}

impl TailStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// State for a source; an unknown source starts at offset 0, sequence 0.
    pub fn get(&self, source_path: &str) -> TailState {
        self.entries
            .get(source_path)
            .cloned()
            .unwrap_or_else(|| TailState::new(source_path, 0, 0))
    }

    pub fn contains(&self, source_path: &str) -> bool {
        self.entries.contains_key(source_path)
    }

    pub fn insert(&mut self, state: TailState) {
        self.entries.insert(state.source_path.clone(), state);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TailState> {
        self.entries.values()
    }

    /// Build states from decoded properties.
    ///
    /// A value that is not a decimal integer makes the whole store corrupt.
    pub fn from_properties(properties: BTreeMap<String, String>) -> Result<Self> {
        let mut states = Self::new();

        for (key, value) in properties {
            if let Some(source) = key.strip_prefix(SIZE_KEY_PREFIX) {
                let offset = parse_counter(&key, &value)?;
                states.entry(source).offset = offset;
            } else if let Some(source) = key.strip_prefix(SEQUENCE_KEY_PREFIX) {
                let sequence = parse_counter(&key, &value)?;
                states.entry(source).sequence = sequence;
            } else {
                states.other.insert(key, value);
            }
        }

        Ok(states)
    }

    /// Flatten states into properties, sorted by key.
    pub fn to_properties(&self) -> BTreeMap<String, String> {
        let mut properties = self.other.clone();
        for state in self.entries.values() {
            properties.insert(size_key(&state.source_path), state.offset.to_string());
            properties.insert(sequence_key(&state.source_path), state.sequence.to_string());
        }
        properties
    }

    fn entry(&mut self, source_path: &str) -> &mut TailState {
        self.entries
            .entry(source_path.to_string())
            .or_insert_with(|| TailState::new(source_path, 0, 0))
    }
}

/// Store key holding the offset of a source
pub fn size_key(source_path: &str) -> String {
    format!("{}{}", SIZE_KEY_PREFIX, source_path)
}

/// Store key holding the sequence number of a source
pub fn sequence_key(source_path: &str) -> String {
    format!("{}{}", SEQUENCE_KEY_PREFIX, source_path)
}

fn parse_counter(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| Error::StoreCorrupt(format!("{}={:?}: {}", key, value, e)))
}
