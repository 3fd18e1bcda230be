// SPDX-License-Identifier: Apache-2.0

//! Configuration for the file receiver.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::receivers::file::error::Error;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// Default history file used to remember offsets between runs
pub const DEFAULT_OFFSETS_PATH: &str = "logtail.history";

/// Default per-cycle read cap, in the configuration grammar
pub const DEFAULT_SIZE_LIMIT: &str = "1m";

/// Maximum number of bytes a single tail cycle will read.
///
/// Accepts plain digits (bytes) or digits followed by `k`/`K` (KiB) or `m`/`M` (MiB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SizeLimit(u64);

impl SizeLimit {
    /// Create a size limit from a byte count
    pub fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    /// Get the limit in bytes
    pub fn bytes(&self) -> u64 {
        self.0
    }
}

impl Default for SizeLimit {
    fn default() -> Self {
        Self(MIB)
    }
}

impl fmt::Display for SizeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 != 0 && self.0 % MIB == 0 {
            write!(f, "{}m", self.0 / MIB)
        } else if self.0 != 0 && self.0 % KIB == 0 {
            write!(f, "{}k", self.0 / KIB)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for SizeLimit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (digits, multiplier) = match s.as_bytes().last() {
            Some(b'k' | b'K') => (&s[..s.len() - 1], KIB),
            Some(b'm' | b'M') => (&s[..s.len() - 1], MIB),
            _ => (s, 1),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Config(format!("invalid size limit: {:?}", s)));
        }

        let bytes = digits
            .parse::<u64>()
            .ok()
            .and_then(|n| n.checked_mul(multiplier))
            .ok_or_else(|| Error::Config(format!("size limit out of range: {:?}", s)))?;

        if bytes == 0 {
            return Err(Error::Config("size limit must be positive".to_string()));
        }

        Ok(Self(bytes))
    }
}

/// Configuration for tailing a source log
#[derive(Debug, Clone)]
pub struct TailConfig {
    /// Path of the history file holding offsets and sequence numbers
    pub offsets_path: PathBuf,
    /// Maximum bytes read per cycle
    pub size_limit: SizeLimit,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            offsets_path: PathBuf::from(DEFAULT_OFFSETS_PATH),
            size_limit: SizeLimit::default(),
        }
    }
}

impl TailConfig {
    pub fn new(offsets_path: impl Into<PathBuf>, size_limit: SizeLimit) -> Self {
        Self {
            offsets_path: offsets_path.into(),
            size_limit,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.offsets_path.as_os_str().is_empty() {
            return Err("offsets path must not be empty".to_string());
        }

        if self.size_limit.bytes() == 0 {
            return Err("size limit must be positive".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_limit_plain_bytes() {
        let limit: SizeLimit = "4096".parse().unwrap();
        assert_eq!(limit.bytes(), 4096);
    }

    #[test]
    fn test_size_limit_suffixes() {
        assert_eq!("8k".parse::<SizeLimit>().unwrap().bytes(), 8 * 1024);
        assert_eq!("8K".parse::<SizeLimit>().unwrap().bytes(), 8 * 1024);
        assert_eq!("2m".parse::<SizeLimit>().unwrap().bytes(), 2 * 1024 * 1024);
        assert_eq!("2M".parse::<SizeLimit>().unwrap().bytes(), 2 * 1024 * 1024);
    }

    #[test]
    fn test_size_limit_default_is_one_mib() {
        assert_eq!(SizeLimit::default().bytes(), 1024 * 1024);
        assert_eq!(
            DEFAULT_SIZE_LIMIT.parse::<SizeLimit>().unwrap(),
            SizeLimit::default()
        );
    }

    #[test]
    fn test_size_limit_rejects_garbage() {
        for bad in ["", "m", "k", "1g", "-5", "1.5m", "abc", "0", "0k"] {
            assert!(bad.parse::<SizeLimit>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_size_limit_overflow() {
        assert!("18446744073709551615m".parse::<SizeLimit>().is_err());
    }

    #[test]
    fn test_size_limit_display() {
        assert_eq!(SizeLimit::from_bytes(1024 * 1024).to_string(), "1m");
        assert_eq!(SizeLimit::from_bytes(3 * 1024).to_string(), "3k");
        assert_eq!(SizeLimit::from_bytes(1000).to_string(), "1000");
    }

    #[test]
    fn test_config_validation() {
        let config = TailConfig::default();
        assert!(config.validate().is_ok());

        let config = TailConfig::new("", SizeLimit::default());
        assert!(config.validate().is_err());
    }
}
