// SPDX-License-Identifier: Apache-2.0

//! Persistence for tail offsets and sequence numbers.
//!
//! Uses a properties-style text file with atomic writes for reliable offset tracking.

mod properties;
mod properties_file;
mod schema;
mod store;

pub use properties_file::PropertiesFileStore;
pub use schema::{
    SEQUENCE_KEY_PREFIX, SIZE_KEY_PREFIX, STORE_COMMENT, TailState, TailStates, sequence_key,
    size_key,
};
#[cfg(test)]
pub use store::MockStore;
pub use store::OffsetStore;
