// SPDX-License-Identifier: Apache-2.0

use crate::init::batch_output::{BatchFormat, ColumnSet};
use crate::receivers::file::entry::Column;

/// How batch files are written
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    pub format: BatchFormat,
    /// Output columns, in order
    pub columns: Vec<Column>,
}

impl BatchConfig {
    pub fn new(format: BatchFormat, columns: ColumnSet) -> Self {
        Self {
            format,
            columns: columns.columns().to_vec(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new(BatchFormat::default(), ColumnSet::default())
    }
}
