// SPDX-License-Identifier: Apache-2.0

use clap::{Args, ValueEnum};
use serde::Deserialize;

use crate::exporters::file::BatchConfig;
use crate::receivers::file::entry::Column;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchFormat {
    #[default]
    /// Comma separated values with a heading row
    Csv,
    /// One JSON object per line
    Json,
}

impl BatchFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchFormat::Csv => "csv",
            BatchFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for BatchFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which columns a batch carries
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnSet {
    #[default]
    /// Date through Stop, the documented headings
    Standard,
    /// Every column either record kind can populate
    Full,
}

impl ColumnSet {
    pub fn columns(&self) -> &'static [Column] {
        match self {
            ColumnSet::Standard => &Column::STANDARD,
            ColumnSet::Full => &Column::ALL,
        }
    }
}

#[derive(Debug, Args, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BatchOutputArgs {
    /// Batch file format
    #[arg(
        value_enum,
        long("batch-format"),
        env = "LOGCAPTURE_BATCH_FORMAT",
        default_value = "csv"
    )]
    pub format: BatchFormat,

    /// Columns written to the batch file
    #[arg(
        value_enum,
        long("batch-columns"),
        env = "LOGCAPTURE_BATCH_COLUMNS",
        default_value = "standard"
    )]
    pub columns: ColumnSet,
}

impl From<&BatchOutputArgs> for BatchConfig {
    fn from(args: &BatchOutputArgs) -> Self {
        BatchConfig::new(args.format, args.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_sets() {
        assert_eq!(ColumnSet::Standard.columns().len(), 11);
        assert_eq!(ColumnSet::Full.columns().len(), 20);
        assert_eq!(ColumnSet::Full.columns()[3], Column::H);
    }

    #[test]
    fn test_args_into_config() {
        let args = BatchOutputArgs {
            format: BatchFormat::Json,
            columns: ColumnSet::Full,
        };
        let config = BatchConfig::from(&args);
        assert_eq!(config.format, BatchFormat::Json);
        assert_eq!(config.columns, Column::ALL.to_vec());
    }

    #[test]
    fn test_format_display() {
        assert_eq!(BatchFormat::Csv.to_string(), "csv");
        assert_eq!(BatchFormat::Json.as_str(), "json");
    }
}
