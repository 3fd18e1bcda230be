// SPDX-License-Identifier: Apache-2.0

use crate::receivers::file::entry::NormalizedRecord;

use super::error::InvalidLine;

/// Parser turns one log line into a normalized record.
///
/// - `Ok(Some(record))`: the line was accepted
/// - `Ok(None)`: the line is well formed but of a kind that is filtered out
/// - `Err(InvalidLine)`: the line is malformed or of an unknown kind
///
/// Parsers hold no per-line state.
pub trait Parser: Send + Sync {
    fn parse(&self, line: &str) -> Result<Option<NormalizedRecord>, InvalidLine>;
}
