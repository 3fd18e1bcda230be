// SPDX-License-Identifier: Apache-2.0

//! Vehicle log parser.
//!
//! Two line grammars are recognized, selected by token count and the fifth token.
//!
//! Location report, 13 tokens:
//! ```text
//! 07:04:42 02/15 V.1.2233 H.0.0 MT_LOCATION Lat/Lon:370620935/-763413842 [Valid] Adher:-1 [Valid] Odom:2668 [Valid] DGPS:On FOM:2
//! ```
//!
//! Timepoint crossing, 21 tokens. Only `Arrival` crossings produce a record;
//! `Dwell` crossings are filtered:
//! ```text
//! 07:04:42 02/15 V.1.2236 H.0.0 MT_TIMEPOINTCROSSING Time:07:04:36 Arrival Rte:4 Dir:2 TP:329 Stop:45 Svc:1 Blk:221 Lat/Lon:370315618/-763461352 [Valid] Adher:2 [Valid] Odom:1924 [Valid] DGPS:On FOM:2
//! ```
//!
//! Dates carry no year; the parser's processing year is substituted.

use chrono::{Datelike, Local};

use super::error::InvalidLine;
use super::fields::{date, label_value, position, time, tokenize, validity};
use super::traits::Parser;
use crate::receivers::file::entry::{Column, NormalizedRecord, RecordKind};

pub const LOCATION_DISCRIMINATOR: &str = "MT_LOCATION";
pub const TIMEPOINT_DISCRIMINATOR: &str = "MT_TIMEPOINTCROSSING";

const LOCATION_TOKENS: usize = 13;
const TIMEPOINT_TOKENS: usize = 21;
const ARRIVAL: &str = "Arrival";

/// Parser for vehicle location logs
#[derive(Debug, Clone)]
pub struct VehicleLogParser {
    year: i32,
}

impl Default for VehicleLogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleLogParser {
    /// Parser that stamps dates with the current local year.
    pub fn new() -> Self {
        Self::with_year(Local::now().year())
    }

    /// Parser that stamps dates with a fixed year.
    pub fn with_year(year: i32) -> Self {
        Self { year }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    fn location(&self, tokens: &[&str]) -> Result<NormalizedRecord, InvalidLine> {
        let mut record = NormalizedRecord::new(RecordKind::Location);
        self.header(&mut record, tokens)?;
        trailer(&mut record, &tokens[5..])?;
        Ok(record)
    }

    fn arrival(&self, tokens: &[&str]) -> Result<NormalizedRecord, InvalidLine> {
        let mut record = NormalizedRecord::new(RecordKind::TimepointArrival);
        self.header(&mut record, tokens)?;

        record.insert(Column::Arrival, label_value(tokens[5], "Time")?);
        record.insert(Column::Route, label_value(tokens[7], "Rte")?);
        record.insert(Column::Direction, label_value(tokens[8], "Dir")?);
        record.insert(Column::Tp, label_value(tokens[9], "TP")?);
        record.insert(Column::Stop, label_value(tokens[10], "Stop")?);
        record.insert(Column::Svc, label_value(tokens[11], "Svc")?);
        record.insert(Column::Blk, label_value(tokens[12], "Blk")?);

        trailer(&mut record, &tokens[13..])?;
        Ok(record)
    }

    /// Time, date, vehicle and H, common to both grammars.
    fn header(&self, record: &mut NormalizedRecord, tokens: &[&str]) -> Result<(), InvalidLine> {
        record.insert(Column::Time, time(tokens[0])?);
        record.insert(Column::Date, date(tokens[1], self.year)?);
        record.insert(Column::Vehicle, tokens[2]);
        record.insert(Column::H, tokens[3]);
        Ok(())
    }
}

/// Position, adherence, odometer and GPS quality: the last eight tokens of
/// both grammars.
fn trailer(record: &mut NormalizedRecord, tokens: &[&str]) -> Result<(), InvalidLine> {
    let (lat, lon) = position(label_value(tokens[0], "Lat/Lon")?)?;
    record.insert(Column::Lat, lat);
    record.insert(Column::Lon, lon);
    record.insert(Column::LocationValidity, validity(tokens[1]));

    record.insert(Column::Adherence, label_value(tokens[2], "Adher")?);
    record.insert(Column::AdherenceValidity, validity(tokens[3]));

    record.insert(Column::Odom, label_value(tokens[4], "Odom")?);
    record.insert(Column::OdomValidity, validity(tokens[5]));

    record.insert(Column::Dgps, label_value(tokens[6], "DGPS")?);
    record.insert(Column::Fom, label_value(tokens[7], "FOM")?);
    Ok(())
}

impl Parser for VehicleLogParser {
    fn parse(&self, line: &str) -> Result<Option<NormalizedRecord>, InvalidLine> {
        let tokens = tokenize(line);
        if tokens.len() < 5 {
            return Err(InvalidLine::TooFewTokens(tokens.len()));
        }

        match (tokens.len(), tokens[4]) {
            (LOCATION_TOKENS, LOCATION_DISCRIMINATOR) => self.location(&tokens).map(Some),
            (TIMEPOINT_TOKENS, TIMEPOINT_DISCRIMINATOR) if tokens[6] == ARRIVAL => {
                self.arrival(&tokens).map(Some)
            }
            (TIMEPOINT_TOKENS, TIMEPOINT_DISCRIMINATOR) => Ok(None),
            (count, discriminator) => Err(InvalidLine::Unrecognized {
                discriminator: discriminator.to_string(),
                tokens: count,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCATION_LINE: &str = "07:04:42 02/15 V.1.2233 H.0.0 MT_LOCATION Lat/Lon:370620935/-763413842 [Valid] Adher:-1 [Valid] Odom:2668 [Valid] DGPS:On FOM:2";
    const ARRIVAL_LINE: &str = "07:04:42 02/15 V.1.2236 H.0.0 MT_TIMEPOINTCROSSING Time:07:04:36 Arrival Rte:4 Dir:2 TP:329 Stop:45 Svc:1 Blk:221 Lat/Lon:370315618/-763461352 [Valid] Adher:2 [Valid] Odom:1924 [Valid] DGPS:On FOM:2";
    const DWELL_LINE: &str = "07:04:42 02/15 V.1.2236 H.0.0 MT_TIMEPOINTCROSSING Time:07:04:36 Dwell:22 Rte:4 Dir:2 TP:329 Stop:45 Svc:1 Blk:221 Lat/Lon:370315618/-763461352 [Valid] Adher:2 [Valid] Odom:1924 [Valid] DGPS:On FOM:2";

    fn parser() -> VehicleLogParser {
        VehicleLogParser::with_year(2012)
    }

    fn fields(record: &NormalizedRecord) -> Vec<(&'static str, &str)> {
        record.iter().map(|(c, v)| (c.as_str(), v)).collect()
    }

    #[test]
    fn test_location() {
        let record = parser().parse(LOCATION_LINE).unwrap().unwrap();

        assert_eq!(record.kind(), RecordKind::Location);
        assert_eq!(
            fields(&record),
            vec![
                ("Date", "2012-02-15"),
                ("Time", "07:04:42"),
                ("Vehicle", "V.1.2233"),
                ("H", "H.0.0"),
                ("Lat", "37.0620935"),
                ("Lon", "-76.3413842"),
                ("Location Valid/Invalid", "V"),
                ("Adherence", "-1"),
                ("Adherence Valid/Invalid", "V"),
                ("Odom", "2668"),
                ("Odom Valid/Invalid", "V"),
                ("DGPS", "On"),
                ("FOM", "2"),
            ]
        );
        assert_eq!(record.get(Column::Route), None);
    }

    #[test]
    fn test_arrival() {
        let record = parser().parse(ARRIVAL_LINE).unwrap().unwrap();

        assert_eq!(record.kind(), RecordKind::TimepointArrival);
        assert_eq!(record.get(Column::Date), Some("2012-02-15"));
        assert_eq!(record.get(Column::Time), Some("07:04:42"));
        assert_eq!(record.get(Column::Vehicle), Some("V.1.2236"));
        assert_eq!(record.get(Column::Lat), Some("37.0315618"));
        assert_eq!(record.get(Column::Lon), Some("-76.3461352"));
        assert_eq!(record.get(Column::LocationValidity), Some("V"));
        assert_eq!(record.get(Column::Adherence), Some("2"));
        assert_eq!(record.get(Column::AdherenceValidity), Some("V"));
        assert_eq!(record.get(Column::Odom), Some("1924"));
        assert_eq!(record.get(Column::OdomValidity), Some("V"));
        assert_eq!(record.get(Column::Dgps), Some("On"));
        assert_eq!(record.get(Column::Fom), Some("2"));
        assert_eq!(record.get(Column::Arrival), Some("07:04:36"));
        assert_eq!(record.get(Column::Route), Some("4"));
        assert_eq!(record.get(Column::Direction), Some("2"));
        assert_eq!(record.get(Column::Tp), Some("329"));
        assert_eq!(record.get(Column::Stop), Some("45"));
        assert_eq!(record.get(Column::Svc), Some("1"));
        assert_eq!(record.get(Column::Blk), Some("221"));
        assert_eq!(record.len(), 20);
    }

    #[test]
    fn test_times_kept_as_written() {
        let line = LOCATION_LINE.replacen("07:04:42", "7:04:42", 1);
        let record = parser().parse(&line).unwrap().unwrap();
        assert_eq!(record.get(Column::Time), Some("7:04:42"));

        // The arrival time is carried through without a format check
        let line = ARRIVAL_LINE.replace("Time:07:04:36", "Time:07:04:36.5");
        let record = parser().parse(&line).unwrap().unwrap();
        assert_eq!(record.get(Column::Arrival), Some("07:04:36.5"));
    }

    #[test]
    fn test_non_ascii_space_stays_in_token() {
        let line = LOCATION_LINE.replace("V.1.2233", "V.1\u{a0}2233");
        let record = parser().parse(&line).unwrap().unwrap();
        assert_eq!(record.get(Column::Vehicle), Some("V.1\u{a0}2233"));
    }

    #[test]
    fn test_dwell_is_filtered() {
        assert_eq!(parser().parse(DWELL_LINE), Ok(None));
    }

    #[test]
    fn test_invalid_markers() {
        let line = LOCATION_LINE
            .replacen("[Valid]", "[Invalid]", 1)
            .replace("Odom:2668 [Valid]", "Odom:2668 [Bad]");
        let record = parser().parse(&line).unwrap().unwrap();
        assert_eq!(record.get(Column::LocationValidity), Some("I"));
        assert_eq!(record.get(Column::AdherenceValidity), Some("V"));
        assert_eq!(record.get(Column::OdomValidity), Some("I"));
    }

    #[test]
    fn test_year_is_processing_year() {
        let record = VehicleLogParser::with_year(2024)
            .parse(LOCATION_LINE)
            .unwrap()
            .unwrap();
        assert_eq!(record.get(Column::Date), Some("2024-02-15"));
    }

    #[test]
    fn test_too_few_tokens() {
        assert_eq!(parser().parse(""), Err(InvalidLine::TooFewTokens(0)));
        assert_eq!(
            parser().parse("07:04:42 02/15 V.1.2233 H.0.0"),
            Err(InvalidLine::TooFewTokens(4))
        );
    }

    #[test]
    fn test_unknown_discriminator() {
        let line = LOCATION_LINE.replace("MT_LOCATION", "MT_SPEED");
        assert!(matches!(
            parser().parse(&line),
            Err(InvalidLine::Unrecognized { tokens: 13, .. })
        ));
    }

    #[test]
    fn test_wrong_token_count() {
        // Location grammar with a token missing
        let line = LOCATION_LINE.replace(" FOM:2", "");
        assert!(matches!(
            parser().parse(&line),
            Err(InvalidLine::Unrecognized { tokens: 12, .. })
        ));

        // A doubled space adds an empty token
        let line = LOCATION_LINE.replace("V.1.2233 ", "V.1.2233  ");
        assert!(matches!(
            parser().parse(&line),
            Err(InvalidLine::Unrecognized { tokens: 14, .. })
        ));
    }

    #[test]
    fn test_trailing_whitespace_ignored() {
        let line = format!("{}  \r", LOCATION_LINE);
        assert!(parser().parse(&line).unwrap().is_some());
    }

    #[test]
    fn test_bad_fields_reject_line() {
        let cases = [
            LOCATION_LINE.replace("07:04:42", ":04:42"),
            LOCATION_LINE.replace("02/15", "02-15"),
            LOCATION_LINE.replace("Lat/Lon:", "LatLon:"),
            LOCATION_LINE.replace("Adher:-1", "Adherence:-1"),
            LOCATION_LINE.replace("Odom:2668", "Odom:"),
            LOCATION_LINE.replace("FOM:2", "FOM:"),
            LOCATION_LINE.replace("DGPS:On", "GPS:On"),
            LOCATION_LINE.replace("370620935/-763413842", "370620935"),
            ARRIVAL_LINE.replace("Time:07:04:36", "Time:"),
            ARRIVAL_LINE.replace("Rte:4", "Route:4"),
            ARRIVAL_LINE.replace("Blk:221", "Blk:"),
        ];

        for line in &cases {
            assert!(parser().parse(line).is_err(), "accepted: {}", line);
        }
    }

    #[test]
    fn test_partial_line_rejected() {
        // An extract that starts mid line loses its leading tokens
        let line = " 02/15 V.1.2233 H.0.0 MT_LOCATION Lat/Lon:370620935/-763413842 [Valid] Adher:-1 [Valid] Odom:2668 [Valid] DGPS:On FOM:2";
        assert!(parser().parse(line).is_err());
    }
}
