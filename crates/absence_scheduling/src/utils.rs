//! ISO datetime recognition and formatting.

use std::fmt::Display;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, SecondsFormat, TimeZone};
use regex::Regex;

static ISO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[0-9]{4}-[01][0-9]-[0-3][0-9]T[0-2][0-9]:[0-5][0-9]:[0-5][0-9]\.[0-9]+(?:[+-][0-2][0-9]:[0-5][0-9]|Z)$",
    )
    .expect("ISO pattern compiles")
});

/// Whether `s` is a full ISO datetime as the API emits it.
///
/// Requires fractional seconds and an explicit `Z` or `±HH:MM` offset, so
/// `2020-03-08T08:00:00` and `2020-03-08` are both rejected.
pub fn is_iso(s: &str) -> bool {
    ISO_PATTERN.is_match(s)
}

/// Parse a string accepted by [`is_iso`], keeping its offset.
pub fn parse_iso(s: &str) -> Option<DateTime<FixedOffset>> {
    if !is_iso(s) {
        return None;
    }
    DateTime::parse_from_rfc3339(s).ok()
}

/// Format with millisecond precision and an explicit offset. The output
/// always satisfies [`is_iso`].
pub fn timestamp_to_iso<Tz>(dt: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
