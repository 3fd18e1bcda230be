// SPDX-License-Identifier: Apache-2.0

//! Token level helpers shared by the line grammars.

use chrono::{Days, NaiveDate, NaiveTime};

use super::error::InvalidLine;

pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Split a line on every ASCII whitespace character, vertical tab included.
///
/// Runs of whitespace produce empty tokens; trailing empty tokens are dropped.
/// Other Unicode spaces (e.g. U+00A0) stay inside their token.
pub fn tokenize(line: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = line.split(is_separator).collect();
    while tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }
    tokens
}

fn is_separator(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\x0B'
}

/// Value of a `label:value` token. The label must match exactly and the
/// value must not be empty.
pub fn label_value<'a>(token: &'a str, label: &'static str) -> Result<&'a str, InvalidLine> {
    let invalid = || InvalidLine::Label {
        expected: label,
        token: token.to_string(),
    };

    let (found, value) = token.split_once(':').ok_or_else(invalid)?;
    if found != label {
        return Err(invalid());
    }
    if value.is_empty() {
        return Err(InvalidLine::EmptyValue(label));
    }
    Ok(value)
}

/// Check an `HH:MM:SS` time. The token is kept as written.
pub fn time(value: &str) -> Result<&str, InvalidLine> {
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .map(|_| value)
        .map_err(|_| InvalidLine::Time(value.to_string()))
}

/// Resolve an `MM/DD` date in `year`.
///
/// Days past the end of the month roll over into the next month, so `02/30`
/// in 2012 is March 1st.
pub fn date(value: &str, year: i32) -> Result<String, InvalidLine> {
    let invalid = || InvalidLine::Date(value.to_string());

    let (month, day) = value.split_once('/').ok_or_else(invalid)?;
    let month = small_number(month).filter(|m| (1..=12).contains(m));
    let day = small_number(day).filter(|d| (1..=31).contains(d));
    let (Some(month), Some(day)) = (month, day) else {
        return Err(invalid());
    };

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.checked_add_days(Days::new(u64::from(day - 1))))
        .map(|d| d.format(DATE_FORMAT).to_string())
        .ok_or_else(invalid)
}

/// Split a `<lat>/<lon>` pair into decimal degrees.
///
/// The source writes both as fixed width integers: latitude has two integer
/// digits and longitude three (including the sign).
pub fn position(value: &str) -> Result<(String, String), InvalidLine> {
    let invalid = || InvalidLine::Position(value.to_string());

    let mut parts = value.split('/');
    let lat = parts.next().and_then(|p| insert_point(p, 2));
    let lon = parts.next().and_then(|p| insert_point(p, 3));
    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok((lat, lon)),
        _ => Err(invalid()),
    }
}

/// `[Valid]` maps to `V`, anything else to `I`.
pub fn validity(token: &str) -> &'static str {
    if token == "[Valid]" { "V" } else { "I" }
}

fn insert_point(part: &str, integer_digits: usize) -> Option<String> {
    let whole = part.get(..integer_digits)?;
    let fraction = part.get(integer_digits..)?;
    Some(format!("{}.{}", whole, fraction))
}

fn small_number(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("a b  c \t"), vec!["a", "b", "", "c"]);
        assert_eq!(tokenize("a b\r"), vec!["a", "b"]);
        assert!(tokenize("   ").is_empty());
        assert_eq!(tokenize(" a"), vec!["", "a"]);
        assert_eq!(tokenize("a\x0Bb\x0Cc"), vec!["a", "b", "c"]);
        assert_eq!(tokenize("V.1\u{a0}2233 H"), vec!["V.1\u{a0}2233", "H"]);
    }

    #[test]
    fn test_label_value() {
        assert_eq!(label_value("Adher:-1", "Adher"), Ok("-1"));
        assert_eq!(label_value("Time:07:04:36", "Time"), Ok("07:04:36"));
        assert_eq!(label_value("FOM:", "FOM"), Err(InvalidLine::EmptyValue("FOM")));
        assert!(matches!(
            label_value("Odometer:12", "Odom"),
            Err(InvalidLine::Label { expected: "Odom", .. })
        ));
        assert!(matches!(
            label_value("DGPS", "DGPS"),
            Err(InvalidLine::Label { .. })
        ));
    }

    #[test]
    fn test_time() {
        assert_eq!(time("07:04:42").unwrap(), "07:04:42");
        assert_eq!(time("7:04:42").unwrap(), "7:04:42");
        assert!(time(":04:42").is_err());
        assert!(time("25:00:00").is_err());
        assert!(time("07:04").is_err());
    }

    #[test]
    fn test_date() {
        assert_eq!(date("02/15", 2012).unwrap(), "2012-02-15");
        assert_eq!(date("2/5", 2012).unwrap(), "2012-02-05");
        assert_eq!(date("02/30", 2012).unwrap(), "2012-03-01");
        assert_eq!(date("02/29", 2013).unwrap(), "2013-03-01");
        assert_eq!(date("12/31", 2012).unwrap(), "2012-12-31");
        assert!(date("/15", 2012).is_err());
        assert!(date("13/01", 2012).is_err());
        assert!(date("02/00", 2012).is_err());
        assert!(date("0215", 2012).is_err());
        assert!(date("ab/cd", 2012).is_err());
    }

    #[test]
    fn test_position() {
        assert_eq!(
            position("370620935/-763413842").unwrap(),
            ("37.0620935".to_string(), "-76.3413842".to_string())
        );
        assert_eq!(
            position("37/-76").unwrap(),
            ("37.".to_string(), "-76.".to_string())
        );
        assert!(position("370620935").is_err());
        assert!(position("3/-763413842").is_err());
        assert!(position("370620935/-7").is_err());
    }

    #[test]
    fn test_validity() {
        assert_eq!(validity("[Valid]"), "V");
        assert_eq!(validity("[Invalid]"), "I");
        assert_eq!(validity("Valid"), "I");
    }
}
