//! Time-of-day normalization and school preference grouping for the absence
//! and substitute management system.
//!
//! Two independent helpers live here:
//! - [`time`]: conversions between timestamps, ISO strings and seconds since
//!   midnight, plus a forgiving parser for typed-in times such as `"915"` or
//!   `"9:15p"`.
//! - [`preferences`]: joins organization, location group and preference query
//!   results into a district tree and partitions it into favorite and hidden
//!   trees.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub mod config;
pub mod preferences;
pub mod time;
pub mod utils;
pub mod zone;

pub use preferences::{
    District, GroupedDistricts, Preference, School, SchoolGroup, group_districts,
    join_grouped_districts, make_districts,
};
pub use time::{SecondsSinceMidnight, TimeNormalizer, Timestamp};
pub use zone::DistrictZone;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    /// A timestamp or ISO string that could not be read as an instant.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// A time of day at or past 24:00.
    #[error("seconds since midnight out of range: {0}")]
    InvalidSeconds(u32),
    /// A malformed configuration value.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for scheduling helpers.
pub type SchedulingResult<T> = Result<T, SchedulingError>;

/// GraphQL `ID` values arrive as either strings or numbers depending on the
/// resolver; both are kept as strings.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
