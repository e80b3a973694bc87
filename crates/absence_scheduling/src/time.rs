//! Time-of-day normalization.
//!
//! Schedules store times of day as seconds since local midnight. The helpers
//! here move between that representation, absolute timestamps and what people
//! type into a time field.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::zone::{DistrictZone, resolve_local};
use crate::{SchedulingError, SchedulingResult};

pub const SECONDS_PER_DAY: u32 = 86_400;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// An absolute instant as the API hands it over: epoch milliseconds or an
/// ISO datetime string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(i64),
    Iso(String),
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Timestamp::Millis(ms)
    }
}

impl From<&str> for Timestamp {
    fn from(s: &str) -> Self {
        Timestamp::Iso(s.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(s: String) -> Self {
        Timestamp::Iso(s)
    }
}

/// Wall-clock time of day, in whole seconds after local midnight.
///
/// Derived from the hour and minute fields of a local time rather than from
/// elapsed time, so 08:00 is `28800` even on a DST transition day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SecondsSinceMidnight(u32);

impl SecondsSinceMidnight {
    pub const MIDNIGHT: Self = Self(0);

    pub fn new(seconds: u32) -> SchedulingResult<Self> {
        if seconds < SECONDS_PER_DAY {
            Ok(Self(seconds))
        } else {
            Err(SchedulingError::InvalidSeconds(seconds))
        }
    }

    pub fn from_hour_minute(hour: u32, minute: u32) -> SchedulingResult<Self> {
        if hour >= 24 || minute >= 60 {
            let seconds = hour.saturating_mul(3600).saturating_add(minute.saturating_mul(60));
            return Err(SchedulingError::InvalidSeconds(seconds));
        }
        Self::new(hour * 3600 + minute * 60)
    }

    pub fn as_secs(self) -> u32 {
        self.0
    }

    pub fn hour(self) -> u32 {
        self.0 / 3600
    }

    pub fn minute(self) -> u32 {
        (self.0 - self.hour() * 3600) / 60
    }

    /// Hour and minute as a clock time; leftover seconds are dropped.
    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }
}

impl TryFrom<u32> for SecondsSinceMidnight {
    type Error = SchedulingError;

    fn try_from(seconds: u32) -> Result<Self, Self::Error> {
        Self::new(seconds)
    }
}

impl From<SecondsSinceMidnight> for u32 {
    fn from(seconds: SecondsSinceMidnight) -> Self {
        seconds.0
    }
}

/// `h:mm AM`, e.g. `8:00 AM` or `7:55 PM`.
impl fmt::Display for SecondsSinceMidnight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_naive_time().format("%-I:%M %p"))
    }
}

/// Seconds since midnight of a zoned time, from its hour and minute.
pub fn seconds_of_day<Tz: TimeZone>(time: &DateTime<Tz>) -> SecondsSinceMidnight {
    SecondsSinceMidnight(time.hour() * 3600 + time.minute() * 60)
}

pub fn seconds_to_formatted_hour_minute_string(seconds: SecondsSinceMidnight) -> String {
    seconds.to_string()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

/// What someone typed into a time field, reduced to an hour, a minute and an
/// optional AM/PM marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FreeTextTime {
    pub hour: u32,
    pub minute: u32,
    pub marker: Option<Meridiem>,
}

impl FreeTextTime {
    /// Digits are read by count: `HHMM`, `HMM`, or an hour alone. Anything
    /// else falls back to 12:00. A `p` anywhere marks PM, otherwise an `a`
    /// marks AM.
    pub fn parse(input: &str) -> Self {
        let lower = input.to_ascii_lowercase();
        let marker = if lower.contains('p') {
            Some(Meridiem::Pm)
        } else if lower.contains('a') {
            Some(Meridiem::Am)
        } else {
            None
        };

        let digits: Vec<u32> = input.chars().filter_map(|c| c.to_digit(10)).collect();
        let number = |ds: &[u32]| ds.iter().fold(0u32, |acc, &d| acc * 10 + d);
        let (mut hour, mut minute) = match digits.len() {
            1 | 2 => (number(&digits), 0),
            3 => (digits[0], number(&digits[1..])),
            4 => (number(&digits[..2]), number(&digits[2..])),
            _ => (12, 0),
        };

        let is_pm = marker == Some(Meridiem::Pm);
        if is_pm && hour > 0 && hour < 12 {
            hour += 12;
        }
        if hour == 0 || hour >= 24 || (hour == 12 && !is_pm) {
            hour = 0;
        }
        if minute > 59 {
            minute = 0;
        }

        let parsed = Self {
            hour,
            minute,
            marker,
        };
        tracing::debug!(input, hour, minute, ?marker, "parsed free-text time");
        parsed
    }

    /// Hours 13 through 23 read as afternoon whether or not a marker was typed.
    pub fn is_pm(&self) -> bool {
        self.marker == Some(Meridiem::Pm) || (13..=23).contains(&self.hour)
    }

    /// Settle the wall-clock hour and minute against the earliest acceptable
    /// time of day.
    ///
    /// An explicit marker is taken at its word. Without one, a morning hour
    /// before `earliest_hour` moves to the afternoon and takes the earliest
    /// minute, and the result never lands before the earliest time.
    pub fn resolve(&self, earliest_hour: u32, earliest_minute: u32) -> (u32, u32) {
        let (mut hour, mut minute) = (self.hour, self.minute);
        if self.marker.is_some() {
            return (hour, minute);
        }

        if !self.is_pm() && hour < earliest_hour {
            hour += 12;
            minute = earliest_minute;
            tracing::debug!(hour, minute, earliest_hour, "ambiguous time moved past earliest");
        }
        if hour < earliest_hour {
            hour = earliest_hour;
        }
        if hour == earliest_hour {
            minute = minute.max(earliest_minute);
        }
        (hour, minute)
    }
}

/// Time-of-day conversions in a fixed zone.
///
/// "Now" comes from the system clock unless pinned with
/// [`TimeNormalizer::with_now`].
#[derive(Clone, Debug)]
pub struct TimeNormalizer<Tz: TimeZone> {
    zone: Tz,
    pinned_now: Option<DateTime<Utc>>,
}

impl TimeNormalizer<DistrictZone> {
    /// Normalizer for the host's local zone.
    pub fn local() -> Self {
        Self::new(DistrictZone::Local)
    }
}

impl<Tz: TimeZone> TimeNormalizer<Tz> {
    pub fn new(zone: Tz) -> Self {
        Self {
            zone,
            pinned_now: None,
        }
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.pinned_now = Some(now);
        self
    }

    pub fn zone(&self) -> &Tz {
        &self.zone
    }

    pub fn now(&self) -> DateTime<Tz> {
        self.pinned_now
            .unwrap_or_else(Utc::now)
            .with_timezone(&self.zone)
    }

    /// Start of the current day in this zone.
    pub fn midnight_time(&self) -> DateTime<Tz> {
        self.at_wall_clock(self.now().date_naive(), NaiveTime::MIN)
    }

    /// Read a timestamp into this zone.
    ///
    /// ISO strings may be RFC 3339 (converted into the zone) or carry no
    /// offset at all, in which case they are read as wall-clock time here.
    pub fn to_zoned(&self, time: &Timestamp) -> SchedulingResult<DateTime<Tz>> {
        match time {
            Timestamp::Millis(ms) => self
                .zone
                .timestamp_millis_opt(*ms)
                .single()
                .ok_or_else(|| SchedulingError::InvalidTimestamp(ms.to_string())),
            Timestamp::Iso(s) => self
                .parse_datetime(s)
                .ok_or_else(|| SchedulingError::InvalidTimestamp(s.clone())),
        }
    }

    pub fn seconds_since_midnight(
        &self,
        time: &Timestamp,
    ) -> SchedulingResult<SecondsSinceMidnight> {
        Ok(seconds_of_day(&self.to_zoned(time)?))
    }

    /// Put a time of day on a calendar day: `date`'s day if given, today
    /// otherwise. Always returns a new value.
    pub fn seconds_applied_to_today(
        &self,
        seconds: SecondsSinceMidnight,
        date: Option<&DateTime<Tz>>,
    ) -> DateTime<Tz> {
        let day = match date {
            Some(date) => date.date_naive(),
            None => self.now().date_naive(),
        };
        self.at_wall_clock(day, seconds.to_naive_time())
    }

    pub fn seconds_to_formatted_hour_minute_string(
        &self,
        seconds: SecondsSinceMidnight,
    ) -> String {
        seconds_to_formatted_hour_minute_string(seconds)
    }

    /// Turn typed-in text such as `"915"`, `"9:15p"` or `"9"` into a time on
    /// `date_string`'s day (today when it is missing or not a full ISO
    /// string).
    ///
    /// `earliest_time` is the earliest acceptable time, e.g. the start of a
    /// shift when parsing its end; it defaults to midnight. It settles whether
    /// an unmarked `"9"` means morning or evening.
    pub fn parse_time_from_string(
        &self,
        time: &str,
        earliest_time: Option<&str>,
        date_string: Option<&str>,
    ) -> SchedulingResult<DateTime<Tz>> {
        let typed = FreeTextTime::parse(time);

        let day = date_string
            .filter(|s| crate::utils::is_iso(s))
            .and_then(|s| self.parse_datetime(s))
            .unwrap_or_else(|| self.now())
            .date_naive();

        let (earliest_hour, earliest_minute) = match earliest_time {
            Some(s) => {
                let earliest = self
                    .parse_datetime(s)
                    .ok_or_else(|| SchedulingError::InvalidTimestamp(s.to_string()))?;
                (earliest.hour(), earliest.minute())
            }
            None => (0, 0),
        };

        let (hour, minute) = typed.resolve(earliest_hour, earliest_minute);
        let clock = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| SchedulingError::InvalidTimestamp(time.to_string()))?;
        Ok(self.at_wall_clock(day, clock))
    }

    fn at_wall_clock(&self, day: NaiveDate, clock: NaiveTime) -> DateTime<Tz> {
        resolve_local(&self.zone, day.and_time(clock))
    }

    fn parse_datetime(&self, s: &str) -> Option<DateTime<Tz>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&self.zone));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(|naive| resolve_local(&self.zone, naive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn typed(input: &str) -> (u32, u32, Option<Meridiem>) {
        let t = FreeTextTime::parse(input);
        (t.hour, t.minute, t.marker)
    }

    #[test]
    fn digit_count_decides_layout() {
        assert_eq!(typed("1015"), (10, 15, None));
        assert_eq!(typed("915"), (9, 15, None));
        assert_eq!(typed("9"), (9, 0, None));
        assert_eq!(typed("11"), (11, 0, None));
        assert_eq!(typed("9:15"), (9, 15, None));
    }

    #[test]
    fn markers_are_case_insensitive() {
        assert_eq!(typed("9:15p"), (21, 15, Some(Meridiem::Pm)));
        assert_eq!(typed("9:15 PM"), (21, 15, Some(Meridiem::Pm)));
        assert_eq!(typed("9a"), (9, 0, Some(Meridiem::Am)));
        assert_eq!(typed("9 A.M."), (9, 0, Some(Meridiem::Am)));
    }

    #[test]
    fn noon_needs_a_pm_marker() {
        assert_eq!(typed("12p"), (12, 0, Some(Meridiem::Pm)));
        assert_eq!(typed("12"), (0, 0, None));
        assert_eq!(typed("12a"), (0, 0, Some(Meridiem::Am)));
        assert_eq!(typed("1230"), (0, 30, None));
    }

    #[test]
    fn empty_or_oversized_input_falls_to_midnight() {
        assert_eq!(typed(""), (0, 0, None));
        assert_eq!(typed("abc"), (0, 0, Some(Meridiem::Am)));
        assert_eq!(typed("123456"), (0, 0, None));
    }

    #[test]
    fn out_of_range_fields_reset() {
        assert_eq!(typed("2400"), (0, 0, None));
        assert_eq!(typed("0975"), (9, 0, None));
        assert_eq!(typed("0"), (0, 0, None));
    }

    #[test]
    fn afternoon_hours_are_implicitly_pm() {
        let t = FreeTextTime::parse("1745");
        assert_eq!((t.hour, t.minute), (17, 45));
        assert!(t.is_pm());
        assert!(!FreeTextTime::parse("945").is_pm());
    }

    #[test]
    fn resolve_shifts_ambiguous_morning_hours() {
        assert_eq!(FreeTextTime::parse("9").resolve(13, 0), (21, 0));
        assert_eq!(FreeTextTime::parse("7").resolve(8, 30), (19, 30));
        assert_eq!(FreeTextTime::parse("900").resolve(0, 0), (9, 0));
    }

    #[test]
    fn resolve_clamps_to_earliest() {
        assert_eq!(FreeTextTime::parse("815").resolve(8, 30), (8, 30));
        assert_eq!(FreeTextTime::parse("845").resolve(8, 30), (8, 45));
        assert_eq!(FreeTextTime::parse("1400").resolve(15, 10), (15, 10));
        assert_eq!(FreeTextTime::parse("9").resolve(23, 0), (23, 0));
    }

    #[test]
    fn resolve_trusts_explicit_markers() {
        assert_eq!(FreeTextTime::parse("9p").resolve(22, 0), (21, 0));
        assert_eq!(FreeTextTime::parse("9a").resolve(13, 0), (9, 0));
    }

    #[test]
    fn seconds_bounds() {
        assert!(SecondsSinceMidnight::new(86_399).is_ok());
        assert_eq!(
            SecondsSinceMidnight::new(86_400),
            Err(SchedulingError::InvalidSeconds(86_400))
        );
        assert!(SecondsSinceMidnight::from_hour_minute(9, 60).is_err());
        assert!(SecondsSinceMidnight::from_hour_minute(24, 0).is_err());
        let s = SecondsSinceMidnight::from_hour_minute(19, 55).expect("valid");
        assert_eq!((s.hour(), s.minute(), s.as_secs()), (19, 55, 71_700));
    }

    #[test]
    fn from_hour_minute_rejects_huge_values() {
        assert_eq!(
            SecondsSinceMidnight::from_hour_minute(2_000_000, 0),
            Err(SchedulingError::InvalidSeconds(u32::MAX))
        );
        assert_eq!(
            SecondsSinceMidnight::from_hour_minute(0, 80_000_000),
            Err(SchedulingError::InvalidSeconds(u32::MAX))
        );
        assert!(SecondsSinceMidnight::from_hour_minute(u32::MAX, u32::MAX).is_err());
    }

    #[test]
    fn seconds_display_as_clock_time() {
        let s = |v| SecondsSinceMidnight::new(v).expect("valid");
        assert_eq!(s(28_800).to_string(), "8:00 AM");
        assert_eq!(s(71_700).to_string(), "7:55 PM");
        assert_eq!(s(0).to_string(), "12:00 AM");
        assert_eq!(s(43_200).to_string(), "12:00 PM");
        assert_eq!(s(28_859).to_string(), "8:00 AM");
    }

    #[test]
    fn seconds_serde_validates_range() {
        let ok: SecondsSinceMidnight = serde_json::from_value(json!(34_200)).expect("in range");
        assert_eq!(ok.as_secs(), 34_200);
        let err: Result<SecondsSinceMidnight, _> = serde_json::from_value(json!(90_000));
        assert!(err.is_err());
        assert_eq!(serde_json::to_value(ok).expect("serialize"), json!(34_200));
    }

    #[test]
    fn timestamp_deserializes_number_or_string() {
        let ms: Timestamp = serde_json::from_value(json!(1_583_668_800_000_i64)).expect("millis");
        assert_eq!(ms, Timestamp::Millis(1_583_668_800_000));
        let iso: Timestamp =
            serde_json::from_value(json!("2020-03-08T12:00:00.000Z")).expect("iso");
        assert_eq!(iso, Timestamp::from("2020-03-08T12:00:00.000Z"));
    }
}
