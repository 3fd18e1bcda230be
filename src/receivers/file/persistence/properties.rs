// SPDX-License-Identifier: Apache-2.0

//! Reader and writer for the `key=value` properties text format.
//!
//! The dialect is the one used by Java `.properties` files, so history files
//! written by older deployments load unchanged:
//! - `#` or `!` as the first non-blank character starts a comment line
//! - the key ends at the first unescaped `=`, `:` or whitespace
//! - a line ending in an odd number of backslashes continues on the next line
//! - `\t`, `\n`, `\r`, `\f` and `\uXXXX` escapes; any other escaped char is literal

use std::collections::BTreeMap;
use std::io::{self, Write};

/// Parse properties text into a sorted map.
///
/// Later duplicates of a key replace earlier ones.
pub fn parse(text: &str) -> Result<BTreeMap<String, String>, String> {
    let mut properties = BTreeMap::new();

    for (number, logical) in logical_lines(text) {
        let (key, value) = split_key_value(&logical);
        let key = unescape(key).map_err(|e| format!("line {}: {}", number, e))?;
        let value = unescape(value).map_err(|e| format!("line {}: {}", number, e))?;
        properties.insert(key, value);
    }

    Ok(properties)
}

/// Write properties: a comment line, a timestamp comment, then sorted entries.
pub fn write<W: Write>(
    mut w: W,
    comment: &str,
    timestamp: &str,
    properties: &BTreeMap<String, String>,
) -> io::Result<()> {
    writeln!(w, "#{}", comment)?;
    writeln!(w, "#{}", timestamp)?;
    for (key, value) in properties {
        writeln!(w, "{}={}", escape(key, true), escape(value, false))?;
    }
    w.flush()
}

/// Join continuation lines and drop blanks/comments. Yields the 1-based number of
/// the first physical line of each logical line.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim_start_matches([' ', '\t', '\u{c}']);

        let (number, mut current) = match pending.take() {
            Some(p) => p,
            None => {
                if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                    continue;
                }
                (idx + 1, String::new())
            }
        };

        if ends_with_continuation(line) {
            current.push_str(&line[..line.len() - 1]);
            pending = Some((number, current));
        } else {
            current.push_str(line);
            out.push((number, current));
        }
    }

    if let Some(last) = pending {
        out.push(last);
    }
    out
}

fn ends_with_continuation(line: &str) -> bool {
    let trailing = line.bytes().rev().take_while(|&b| b == b'\\').count();
    trailing % 2 == 1
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\u{c}' => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches([' ', '\t', '\u{c}']);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches([' ', '\t', '\u{c}']);
    }
    (key, rest)
}

fn unescape(s: &str) -> Result<String, String> {
    let mut units: Vec<u16> = Vec::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u16; 2];
            units.extend_from_slice(c.encode_utf16(&mut buf));
            continue;
        }

        match chars.next() {
            Some('t') => units.push('\t' as u16),
            Some('n') => units.push('\n' as u16),
            Some('r') => units.push('\r' as u16),
            Some('f') => units.push(0x0c),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 {
                    return Err(format!("truncated \\u escape: {:?}", hex));
                }
                let unit = u16::from_str_radix(&hex, 16)
                    .map_err(|_| format!("malformed \\u escape: {:?}", hex))?;
                units.push(unit);
            }
            Some(other) => {
                let mut buf = [0u16; 2];
                units.extend_from_slice(other.encode_utf16(&mut buf));
            }
            None => {}
        }
    }

    String::from_utf16(&units).map_err(|e| e.to_string())
}

fn escape(s: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(s.len());

    for (i, c) in s.chars().enumerate() {
        match c {
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            c if c < ' ' || c > '~' => {
                let mut buf = [0u16; 2];
                for unit in c.encode_utf16(&mut buf) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
            c => out.push(c),
        }
    }

    out
}
