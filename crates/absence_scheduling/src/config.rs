use chrono::FixedOffset;

use crate::time::TimeNormalizer;
use crate::zone::DistrictZone;
use crate::{SchedulingError, SchedulingResult};

pub const UTC_OFFSET_VAR: &str = "ABSENCE_SCHEDULING_UTC_OFFSET";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub zone: DistrictZone,
}

impl Config {
    pub fn from_env() -> SchedulingResult<Self> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    ///
    /// `ABSENCE_SCHEDULING_UTC_OFFSET` is `local` (the default), `utc`, or an
    /// offset such as `-05:00`.
    pub fn from_env_with<F>(mut get: F) -> SchedulingResult<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let zone = match get(UTC_OFFSET_VAR) {
            Some(raw) => parse_zone(&raw)?,
            None => DistrictZone::Local,
        };
        Ok(Self { zone })
    }

    pub fn normalizer(&self) -> TimeNormalizer<DistrictZone> {
        TimeNormalizer::new(self.zone)
    }
}

fn parse_zone(raw: &str) -> SchedulingResult<DistrictZone> {
    let value = raw.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("local") {
        return Ok(DistrictZone::Local);
    }
    if value.eq_ignore_ascii_case("utc") || value == "Z" {
        return FixedOffset::east_opt(0)
            .map(DistrictZone::Fixed)
            .ok_or_else(|| invalid_offset(raw));
    }

    value
        .parse::<FixedOffset>()
        .map(DistrictZone::Fixed)
        .map_err(|_| invalid_offset(raw))
}

fn invalid_offset(raw: &str) -> SchedulingError {
    SchedulingError::Config(format!(
        "{UTC_OFFSET_VAR} must be `local`, `utc` or `±HH:MM`, got `{raw}`"
    ))
}
