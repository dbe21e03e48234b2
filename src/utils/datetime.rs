//! Date and time utility functions
//!
//! Dates travel as `YYYY-MM-DD` text both in SQLite and over the wire.
//! Timestamps come from SQLite's `datetime('now')` locally and from the
//! server as RFC 3339 strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Standard date format for deadlines
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format produced by SQLite's `datetime('now')`
pub const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a date string in YYYY-MM-DD format to NaiveDate
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str, DATE_FORMAT)
}

/// Format a NaiveDate to YYYY-MM-DD string
pub fn format_ymd(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// Parse a timestamp written either by SQLite or by the server.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, RFC 3339 (offset is dropped after
/// conversion to UTC) and a bare date (midnight).
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, SQLITE_TIMESTAMP_FORMAT) {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.naive_utc());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts);
    }
    parse_date(value).ok().and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Human-readable span between two instants, order-independent.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use tasklist::utils::datetime::calculate_duration;
///
/// let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap().and_hms_opt(10, 30, 0).unwrap();
/// assert_eq!(calculate_duration(start, end), "2 day(s), 2 hour(s) and 30 minute(s)");
/// ```
pub fn calculate_duration(start: NaiveDateTime, end: NaiveDateTime) -> String {
    let diff = (end - start).abs();

    let days = diff.num_days();
    let hours = diff.num_hours() % 24;
    let minutes = diff.num_minutes() % 60;

    format!("{} day(s), {} hour(s) and {} minute(s)", days, hours, minutes)
}
