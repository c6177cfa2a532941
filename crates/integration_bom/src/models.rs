//! BOM feed models
//!
//! Only the envelope is typed. Observation records stay loosely typed JSON
//! objects because their field set varies by station.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level feed document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEnvelope {
    /// The `observations` block
    pub observations: FeedObservations,
}

/// `observations` block: station header plus records, freshest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedObservations {
    /// Station metadata, usually a single entry
    #[serde(default)]
    pub header: Vec<FeedHeader>,
    /// Observation records
    pub data: Vec<Map<String, Value>>,
}

/// Station metadata published with the feed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedHeader {
    /// Station name
    #[serde(default)]
    pub name: Option<String>,
    /// State or territory
    #[serde(default)]
    pub state: Option<String>,
    /// Product identifier, e.g. `IDQ60801`
    #[serde(rename = "ID", default)]
    pub product_id: Option<String>,
    /// Time zone abbreviation of the local timestamps
    #[serde(default)]
    pub time_zone: Option<String>,
    /// Local refresh message
    #[serde(default)]
    pub refresh_message: Option<String>,
}

impl FeedEnvelope {
    /// Station name from the first header entry
    pub fn station_name(&self) -> Option<&str> {
        self.observations
            .header
            .first()
            .and_then(|h| h.name.as_deref())
    }

    /// Consume into the records
    pub fn into_records(self) -> Vec<Map<String, Value>> {
        self.observations.data
    }
}
