//! Date utilities for `YYYYMMDD` day keys.

use chrono::{Days, NaiveDate};

use crate::{MirrorError, Result};

/// Format used by the upstream API for day keys.
pub const YMD_FORMAT: &str = "%Y%m%d";

/// Parse a `YYYYMMDD` string into a date.
pub fn parse_ymd(s: &str) -> Result<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MirrorError::Validation(format!("invalid date: {s}")));
    }
    NaiveDate::parse_from_str(s, YMD_FORMAT)
        .map_err(|e| MirrorError::Validation(format!("invalid date {s}: {e}")))
}

/// Format a date as `YYYYMMDD`.
pub fn format_ymd(date: NaiveDate) -> String {
    date.format(YMD_FORMAT).to_string()
}

/// Return the `YYYYMMDD` key of the day after `s`.
pub fn next_day_ymd(s: &str) -> Result<String> {
    let date = parse_ymd(s)?;
    let next = date
        .checked_add_days(Days::new(1))
        .ok_or_else(|| MirrorError::Validation(format!("date out of range: {s}")))?;
    Ok(format_ymd(next))
}
