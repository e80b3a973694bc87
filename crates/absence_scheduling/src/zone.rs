//! The wall-clock zone a district keeps its schedule in.

use chrono::{
    DateTime, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta,
    TimeZone,
};

/// Either the host's local zone (DST-aware) or a fixed UTC offset.
///
/// Values of `DateTime<DistrictZone>` only carry their offset, so
/// `DateTime::timezone()` reports `Fixed` even for a local value. Code that
/// builds new wall-clock values should go through the zone it was configured
/// with rather than the one recovered from a `DateTime`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DistrictZone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl TimeZone for DistrictZone {
    type Offset = FixedOffset;

    fn from_offset(offset: &FixedOffset) -> Self {
        DistrictZone::Fixed(*offset)
    }

    fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
        self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
        match self {
            DistrictZone::Local => Local.offset_from_local_datetime(local),
            DistrictZone::Fixed(offset) => offset.offset_from_local_datetime(local),
        }
    }

    fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
        self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
        match self {
            DistrictZone::Local => Local.offset_from_utc_datetime(utc),
            DistrictZone::Fixed(offset) => offset.offset_from_utc_datetime(utc),
        }
    }
}

/// Pin a wall-clock value to an instant in `zone`.
///
/// A wall-clock value inside a spring-forward gap moves one hour later; one
/// inside a fall-back overlap takes the earlier instant.
pub(crate) fn resolve_local<Tz: TimeZone>(zone: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    zone.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            tracing::trace!(%naive, "wall-clock time falls in a gap; moving forward an hour");
            zone.from_local_datetime(&(naive + TimeDelta::hours(1)))
                .earliest()
        })
        .unwrap_or_else(|| zone.from_utc_datetime(&naive))
}
