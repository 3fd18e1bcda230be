// SPDX-License-Identifier: Apache-2.0

//! Artifact name templates.
//!
//! A template is a path with optional placeholders that are filled in when an
//! extract is written:
//!
//! | placeholder              | value                      |
//! |--------------------------|----------------------------|
//! | `{0}` or `{sequence}`    | tail sequence number       |
//! | `{1}` or `{hour}`        | hour of day (0-23)         |
//! | `{2}` or `{minute}`      | minute of hour (0-59)      |
//!
//! Anything else, including unknown `{...}` groups, is copied through unchanged.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Timelike};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    template: String,
}

impl NameTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The raw template text
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitute sequence, hour and minute into the template.
    pub fn render<Tz: TimeZone>(&self, sequence: u64, now: &DateTime<Tz>) -> PathBuf {
        let hour = now.hour();
        let minute = now.minute();

        let mut out = String::with_capacity(self.template.len() + 8);
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open..];

            let Some(close) = after.find('}') else {
                out.push_str(after);
                rest = "";
                break;
            };

            match &after[1..close] {
                "0" | "sequence" => out.push_str(&sequence.to_string()),
                "1" | "hour" => out.push_str(&hour.to_string()),
                "2" | "minute" => out.push_str(&minute.to_string()),
                _ => out.push_str(&after[..=close]),
            }
            rest = &after[close + 1..];
        }
        out.push_str(rest);

        PathBuf::from(out)
    }
}

impl fmt::Display for NameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

impl From<&str> for NameTemplate {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NameTemplate {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
