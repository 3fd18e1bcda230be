// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// Output column of a normalized record.
///
/// Variants are declared in output order, so `Ord` follows the column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Date,
    Time,
    Vehicle,
    H,
    Lat,
    Lon,
    LocationValidity,
    Adherence,
    AdherenceValidity,
    Route,
    Direction,
    Stop,
    Arrival,
    Tp,
    Svc,
    Blk,
    Odom,
    OdomValidity,
    Dgps,
    Fom,
}

impl Column {
    /// The documented output headings
    pub const STANDARD: [Column; 11] = [
        Column::Date,
        Column::Time,
        Column::Vehicle,
        Column::Lat,
        Column::Lon,
        Column::LocationValidity,
        Column::Adherence,
        Column::AdherenceValidity,
        Column::Route,
        Column::Direction,
        Column::Stop,
    ];

    /// Every column either record kind can populate
    pub const ALL: [Column; 20] = [
        Column::Date,
        Column::Time,
        Column::Vehicle,
        Column::H,
        Column::Lat,
        Column::Lon,
        Column::LocationValidity,
        Column::Adherence,
        Column::AdherenceValidity,
        Column::Route,
        Column::Direction,
        Column::Stop,
        Column::Arrival,
        Column::Tp,
        Column::Svc,
        Column::Blk,
        Column::Odom,
        Column::OdomValidity,
        Column::Dgps,
        Column::Fom,
    ];

    /// Heading text
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::Time => "Time",
            Column::Vehicle => "Vehicle",
            Column::H => "H",
            Column::Lat => "Lat",
            Column::Lon => "Lon",
            Column::LocationValidity => "Location Valid/Invalid",
            Column::Adherence => "Adherence",
            Column::AdherenceValidity => "Adherence Valid/Invalid",
            Column::Route => "Route",
            Column::Direction => "Direction",
            Column::Stop => "Stop",
            Column::Arrival => "Arrival",
            Column::Tp => "TP",
            Column::Svc => "Svc",
            Column::Blk => "Blk",
            Column::Odom => "Odom",
            Column::OdomValidity => "Odom Valid/Invalid",
            Column::Dgps => "DGPS",
            Column::Fom => "FOM",
        }
    }

    /// Look up a column by its heading text
    pub fn from_heading(heading: &str) -> Option<Column> {
        Column::ALL.iter().copied().find(|c| c.as_str() == heading)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
