//! Station timestamp value object
//!
//! The feed publishes times as 14-digit `YYYYMMDDHHMMSS` strings, both in
//! station-local time (`local_date_time_full`) and in UTC (`aifstime_utc`).
//! No offset is attached, so a `StationTimestamp` is a naive civil time.
//!
//! # Examples
//!
//! ```
//! use domain::value_objects::{to_local_display, to_utc_epoch_millis};
//!
//! assert_eq!(
//!     to_local_display("20210215133000").unwrap(),
//!     "Monday, 15 February 2021 13:30:00"
//! );
//! assert_eq!(to_utc_epoch_millis("20210215133000").unwrap(), 1_613_395_800_000);
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::DomainError;

/// Parse format of the feed timestamps
const STATION_FORMAT: &str = "%Y%m%d%H%M%S";
/// Human-readable local format
const DISPLAY_FORMAT: &str = "%A, %d %B %Y %H:%M:%S";
/// Number of digits in a station timestamp
const STATION_LEN: usize = 14;

/// A validated `YYYYMMDDHHMMSS` timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StationTimestamp(NaiveDateTime);

impl StationTimestamp {
    /// Parse a 14-digit station timestamp
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimestamp` for a wrong length, non-digit
    /// characters, or an impossible calendar date or time.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        if value.len() != STATION_LEN {
            return Err(DomainError::invalid_timestamp(
                value,
                format!("expected {STATION_LEN} digits, got {} characters", value.len()),
            ));
        }
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::invalid_timestamp(
                value,
                "contains non-digit characters",
            ));
        }

        NaiveDateTime::parse_from_str(value, STATION_FORMAT)
            .map(Self)
            .map_err(|e| DomainError::invalid_timestamp(value, e.to_string()))
    }

    /// Wrap an existing civil time
    #[must_use]
    pub const fn from_naive(value: NaiveDateTime) -> Self {
        Self(value)
    }

    /// The underlying civil time
    #[must_use]
    pub const fn naive(self) -> NaiveDateTime {
        self.0
    }

    /// Format as e.g. `Monday, 15 February 2021 13:30:00`
    #[must_use]
    pub fn to_local_display(self) -> String {
        self.0.format(DISPLAY_FORMAT).to_string()
    }

    /// Interpret as UTC and return milliseconds since the Unix epoch
    ///
    /// Whole seconds scaled by 1000; sub-second precision never exists in
    /// the feed format, so this is the truncated value.
    #[must_use]
    pub fn to_utc_epoch_millis(self) -> i64 {
        self.0.and_utc().timestamp() * 1000
    }

    /// Format back into the 14-digit feed representation
    #[must_use]
    pub fn to_station_string(self) -> String {
        self.0.format(STATION_FORMAT).to_string()
    }
}

impl fmt::Display for StationTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(STATION_FORMAT))
    }
}

impl FromStr for StationTimestamp {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for StationTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_station_string())
    }
}

impl<'de> Deserialize<'de> for StationTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Reformat a station-local timestamp for display
///
/// # Errors
///
/// Returns `DomainError::InvalidTimestamp` if `ts` is malformed.
pub fn to_local_display(ts: &str) -> Result<String, DomainError> {
    StationTimestamp::parse(ts).map(|t| t.to_local_display())
}

/// Convert a UTC station timestamp to epoch milliseconds
///
/// # Errors
///
/// Returns `DomainError::InvalidTimestamp` if `ts` is malformed.
pub fn to_utc_epoch_millis(ts: &str) -> Result<i64, DomainError> {
    StationTimestamp::parse(ts).map(|t| t.to_utc_epoch_millis())
}
