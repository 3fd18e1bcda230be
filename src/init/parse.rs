// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use tower::BoxError;

use crate::receivers::file::{NameTemplate, SizeLimit};

/// Parse a read cap such as `4096`, `64k` or `1m`
pub(crate) fn parse_size_limit(s: &str) -> Result<SizeLimit, BoxError> {
    Ok(s.parse::<SizeLimit>()?)
}

/// Parse an artifact name template; it must name something
pub(crate) fn parse_name_template(s: &str) -> Result<NameTemplate, BoxError> {
    if s.trim().is_empty() {
        return Err("name template must not be empty".into());
    }
    Ok(NameTemplate::new(s))
}

/// Parse a path that must not be empty
pub(crate) fn parse_path(s: &str) -> Result<PathBuf, BoxError> {
    if s.trim().is_empty() {
        return Err("path must not be empty".into());
    }
    Ok(PathBuf::from(s))
}
