//! Meeting date normalisation.
//!
//! `sco-update` expects `date-begin` / `date-end` as
//! `YYYY-MM-DDTHH:MM:SS±HHMM`. Callers usually have something looser, so
//! the common shapes are accepted here and rewritten before a request is
//! built. Values without an offset are read in the configured offset.

use crate::error::{ConnectError, ConnectResult};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};

/// Wire format for meeting dates.
pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M:%S%z", "%Y-%m-%dT%H:%M%z"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Parse free-form date text into a zoned timestamp.
pub fn parse_date(input: &str, offset: FixedOffset) -> ConnectResult<DateTime<FixedOffset>> {
    let s = input.trim();
    let invalid = || ConnectError::InvalidDate {
        input: input.to_string(),
    };
    if s.is_empty() {
        return Err(invalid());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(invalid)?;

    offset.from_local_datetime(&naive).single().ok_or_else(invalid)
}

/// Parse `input` and render it in the wire format.
pub fn normalize_date(input: &str, offset: FixedOffset) -> ConnectResult<String> {
    Ok(parse_date(input, offset)?.format(WIRE_FORMAT).to_string())
}
