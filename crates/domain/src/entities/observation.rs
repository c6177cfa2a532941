//! Observation records
//!
//! A [`RawObservation`] is the loosely typed record published by the feed.
//! Enrichment happens in two steps so the caller can stop before fetching
//! the snapshot image when the record is unusable:
//!
//! 1. [`RawObservation::prepare`] validates the timestamps, derives the key,
//!    `epoch_date` and `wind_angle`, and drops `sort_order`.
//! 2. [`PreparedObservation::with_image`] attaches the encoded image and
//!    yields the final [`Enrichment`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::DomainError;
use crate::value_objects::{ObservationKey, StationTimestamp, wind_dir_to_angle};

/// Field names with meaning to the pipeline
pub mod field {
    /// Station-local observation time, `YYYYMMDDHHMMSS`
    pub const LOCAL_DATE_TIME_FULL: &str = "local_date_time_full";
    /// UTC observation time, `YYYYMMDDHHMMSS`
    pub const AIFSTIME_UTC: &str = "aifstime_utc";
    /// 16-point wind direction label
    pub const WIND_DIR: &str = "wind_dir";
    /// Upstream ordering hint, dropped during enrichment
    pub const SORT_ORDER: &str = "sort_order";
    /// Derived: UTC epoch milliseconds
    pub const EPOCH_DATE: &str = "epoch_date";
    /// Derived: wind bearing in degrees
    pub const WIND_ANGLE: &str = "wind_angle";
    /// Derived: base64 snapshot image
    pub const LOCAL_IMAGE_B64: &str = "local_image_b64";

    /// Fields written by enrichment; raw values under these names are replaced
    pub const DERIVED: [&str; 3] = [EPOCH_DATE, WIND_ANGLE, LOCAL_IMAGE_B64];
}

/// One record of the feed's `observations.data` sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawObservation(Map<String, Value>);

impl RawObservation {
    /// Wrap a decoded JSON object
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// All fields as published
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Look up a single field
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Station-local timestamp string
    pub fn local_date_time_full(&self) -> Result<&str, DomainError> {
        self.required_str(field::LOCAL_DATE_TIME_FULL)
    }

    /// UTC timestamp string
    pub fn aifstime_utc(&self) -> Result<&str, DomainError> {
        self.required_str(field::AIFSTIME_UTC)
    }

    /// Wind direction label, if present and a string
    #[must_use]
    pub fn wind_dir(&self) -> Option<&str> {
        self.0.get(field::WIND_DIR).and_then(Value::as_str)
    }

    /// The record without `sort_order`, for display
    #[must_use]
    pub fn without_sort_order(mut self) -> Map<String, Value> {
        self.0.shift_remove(field::SORT_ORDER);
        self.0
    }

    /// Validate and derive everything that does not need the image
    ///
    /// # Errors
    ///
    /// Fails if `local_date_time_full` or `aifstime_utc` is missing, not a
    /// string, or not a valid station timestamp.
    pub fn prepare(self) -> Result<PreparedObservation, DomainError> {
        let key = ObservationKey::from_local_timestamp(self.local_date_time_full()?)?;
        let epoch_date = StationTimestamp::parse(self.aifstime_utc()?)?.to_utc_epoch_millis();
        let wind_angle = wind_dir_to_angle(self.wind_dir());

        let mut fields = self.0;
        fields.shift_remove(field::SORT_ORDER);
        for derived in field::DERIVED {
            fields.shift_remove(derived);
        }

        Ok(PreparedObservation {
            key,
            fields,
            epoch_date,
            wind_angle,
        })
    }

    fn required_str(&self, name: &str) -> Result<&str, DomainError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Err(DomainError::MissingField(name.to_string())),
            Some(value) => value.as_str().ok_or_else(|| DomainError::InvalidFieldType {
                field: name.to_string(),
                expected: "string",
            }),
        }
    }
}

impl From<Map<String, Value>> for RawObservation {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// A validated observation waiting for its snapshot image
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedObservation {
    key: ObservationKey,
    fields: Map<String, Value>,
    epoch_date: i64,
    wind_angle: Option<f64>,
}

impl PreparedObservation {
    /// Persistence key derived from the raw local timestamp
    #[must_use]
    pub const fn key(&self) -> &ObservationKey {
        &self.key
    }

    /// Attach the encoded image; an empty string marks a failed fetch
    #[must_use]
    pub fn with_image(self, local_image_b64: impl Into<String>) -> Enrichment {
        Enrichment {
            key: self.key,
            document: EnrichedObservation {
                fields: self.fields,
                epoch_date: self.epoch_date,
                wind_angle: self.wind_angle,
                local_image_b64: local_image_b64.into(),
            },
        }
    }
}

/// Observation ready for storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedObservation {
    /// Remaining raw fields, `sort_order` excluded
    #[serde(flatten)]
    fields: Map<String, Value>,
    /// UTC epoch milliseconds of `aifstime_utc`
    pub epoch_date: i64,
    /// Bearing of `wind_dir`, `null` for unknown labels
    pub wind_angle: Option<f64>,
    /// Base64 snapshot image, empty if it could not be fetched
    pub local_image_b64: String,
}

impl EnrichedObservation {
    /// Raw fields carried over from the feed
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Look up a carried-over raw field
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Whether the snapshot image made it into the record
    #[must_use]
    pub fn has_image(&self) -> bool {
        !self.local_image_b64.is_empty()
    }
}

/// Result of enriching one observation
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    /// Document key, the raw `local_date_time_full`
    pub key: ObservationKey,
    /// Enriched document
    pub document: EnrichedObservation,
}
