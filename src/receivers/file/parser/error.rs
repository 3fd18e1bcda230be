// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Why a log line was rejected.
///
/// Rejections are per line; the batch carries on with the next line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidLine {
    #[error("expected at least 5 tokens, found {0}")]
    TooFewTokens(usize),

    #[error("unrecognized record: {discriminator} with {tokens} tokens")]
    Unrecognized { discriminator: String, tokens: usize },

    #[error("expected label {expected:?} in {token:?}")]
    Label {
        expected: &'static str,
        token: String,
    },

    #[error("empty value for label {0:?}")]
    EmptyValue(&'static str),

    #[error("invalid time {0:?}")]
    Time(String),

    #[error("invalid date {0:?}")]
    Date(String),

    #[error("invalid position {0:?}")]
    Position(String),
}
