//! Document key for a stored observation

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;
use crate::value_objects::StationTimestamp;

/// Persistence key of an enriched observation
///
/// Holds the raw `local_date_time_full` string exactly as the feed sent it,
/// so re-ingesting the same upstream observation yields the same key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationKey(String);

impl ObservationKey {
    /// Build a key from a raw local timestamp
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimestamp` if the value is not a valid
    /// station timestamp; a corrupt key must never reach the store.
    pub fn from_local_timestamp(raw: &str) -> Result<Self, DomainError> {
        StationTimestamp::parse(raw)?;
        Ok(Self(raw.to_string()))
    }

    /// The key as stored
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObservationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObservationKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
