// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::fmt;

use super::Column;

/// Which line grammar produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Location,
    TimepointArrival,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Location => f.write_str("location"),
            RecordKind::TimepointArrival => f.write_str("timepoint_arrival"),
        }
    }
}

/// One accepted log line, as column values.
///
/// Columns a record kind does not populate are absent; writers render them empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    kind: RecordKind,
    fields: BTreeMap<Column, String>,
}

impl NormalizedRecord {
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            fields: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn insert(&mut self, column: Column, value: impl Into<String>) {
        self.fields.insert(column, value.into());
    }

    pub fn get(&self, column: Column) -> Option<&str> {
        self.fields.get(&column).map(String::as_str)
    }

    /// Value for a column, empty when absent
    pub fn value(&self, column: Column) -> &str {
        self.get(column).unwrap_or("")
    }

    /// Populated columns in column order
    pub fn iter(&self) -> impl Iterator<Item = (Column, &str)> {
        self.fields.iter().map(|(c, v)| (*c, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_columns_are_empty() {
        let mut record = NormalizedRecord::new(RecordKind::Location);
        record.insert(Column::Vehicle, "V.1.2233");

        assert_eq!(record.get(Column::Vehicle), Some("V.1.2233"));
        assert_eq!(record.get(Column::Route), None);
        assert_eq!(record.value(Column::Route), "");
        assert_eq!(record.kind(), RecordKind::Location);
    }

    #[test]
    fn test_iter_in_column_order() {
        let mut record = NormalizedRecord::new(RecordKind::TimepointArrival);
        record.insert(Column::Stop, "45");
        record.insert(Column::Date, "2012-02-15");
        record.insert(Column::Lat, "37.0");

        let columns: Vec<Column> = record.iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec![Column::Date, Column::Lat, Column::Stop]);
    }
}
