//! Date/time utilities for gator.
//!
//! Feeds in the wild publish dates in a handful of incompatible formats, so
//! the normalizer tries a fixed, ordered list of layouts and takes the first
//! match. Layouts without zone information are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

/// Raised when a date string matches none of the known layouts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to parse date string '{input}' using {layouts_tried} layouts")]
pub struct DateFormatError {
    /// The original, unmodified input string.
    pub input: String,
    /// How many layouts were attempted before giving up.
    pub layouts_tried: usize,
}

enum Layout {
    /// RFC-1123 / RFC-2822, numeric zone or zone name.
    Rfc2822,
    /// RFC-3339, with or without fractional seconds.
    Rfc3339,
    /// A naive datetime format, assumed UTC.
    NaiveDateTime(&'static str),
    /// A bare date, taken as midnight UTC.
    NaiveDate(&'static str),
}

// Order matters only for strings that could match several layouts: first
// match wins, no further validation.
const LAYOUTS: &[Layout] = &[
    Layout::Rfc2822,
    Layout::Rfc3339,
    Layout::NaiveDateTime("%Y-%m-%d %H:%M:%S"),
    Layout::NaiveDateTime("%Y/%m/%d %H:%M:%S"),
    Layout::NaiveDateTime("%d %b %Y %H:%M:%S"),
    Layout::NaiveDate("%Y-%m-%d"),
];

/// Parse a raw feed date string into a canonical UTC timestamp.
pub fn parse_flexible(input: &str) -> Result<DateTime<Utc>, DateFormatError> {
    let trimmed = input.trim();

    for layout in LAYOUTS {
        let parsed = match layout {
            Layout::Rfc2822 => DateTime::parse_from_rfc2822(trimmed)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Layout::Rfc3339 => DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Layout::NaiveDateTime(fmt) => NaiveDateTime::parse_from_str(trimmed, fmt)
                .ok()
                .map(|naive| naive.and_utc()),
            Layout::NaiveDate(fmt) => NaiveDate::parse_from_str(trimmed, fmt)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc()),
        };

        if let Some(dt) = parsed {
            return Ok(dt);
        }
    }

    Err(DateFormatError {
        input: input.to_string(),
        layouts_tried: LAYOUTS.len(),
    })
}

/// Format a timestamp for TEXT storage. Second precision keeps the stored
/// strings lexicographically ordered.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse a stored timestamp string back to DateTime<Utc>.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Try SQLite datetime format
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}
