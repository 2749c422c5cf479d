//! Due-date parsing
//!
//! Dates are `YYYY.MM.DD` and may be typed with Latin, Arabic-Indic or
//! Persian digits. Values are taken as entered; no calendar conversion.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

use crate::core::ParseError;

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9]+)\.([0-9]+)\.([0-9]+)$").expect("date pattern is valid")
    })
}

/// Replace Arabic-Indic (U+0660..) and Persian (U+06F0..) digits with ASCII digits
pub fn normalize_digits(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            other => other,
        })
        .collect()
}

pub fn parse_due_date(text: &str) -> Result<NaiveDate, ParseError> {
    let normalized = normalize_digits(text.trim());
    let captures = date_pattern()
        .captures(&normalized)
        .ok_or_else(|| ParseError::Pattern(text.to_string()))?;

    let field = |i: usize| captures.get(i).map(|m| m.as_str()).unwrap_or_default();
    let pattern_err = || ParseError::Pattern(text.to_string());

    let year: i32 = field(1).parse().map_err(|_| pattern_err())?;
    let month: u32 = field(2).parse().map_err(|_| pattern_err())?;
    let day: u32 = field(3).parse().map_err(|_| pattern_err())?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| ParseError::InvalidDate(text.to_string()))
}
