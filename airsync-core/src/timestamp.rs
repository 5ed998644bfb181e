//! Timestamp parsing and normalization.
//!
//! Every instant is converted to UTC and truncated to whole seconds before it
//! is stored on a [`Record`](crate::Record), so `…:00Z`, `…:00.000Z` and
//! `…:00+00:00` all compare equal.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};

use crate::error::RecordError;

/// Formats accepted when the value carries no UTC offset; interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parse a timestamp string into a normalized UTC instant.
///
/// Accepts RFC 3339 with any offset, offset-less date-times (taken as UTC),
/// and bare dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RecordError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(RecordError::MissingTimestamp);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(normalize(parsed.with_timezone(&Utc)));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(normalize(naive.and_utc()));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(RecordError::InvalidTimestamp {
        value: value.to_string(),
    })
}

/// Truncate to the comparison precision (whole seconds).
pub fn normalize(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(0)
}
