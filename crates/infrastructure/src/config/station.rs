//! Station and upstream HTTP configuration

use domain::{ObservationSource, WELLCAMP_FEED_URL, WELLCAMP_IMAGE_URL};
use serde::{Deserialize, Serialize};

/// Which station to index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationConfig {
    /// BOM observation feed URL
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// Camera snapshot URL
    #[serde(default = "default_image_url")]
    pub image_url: String,
}

fn default_feed_url() -> String {
    WELLCAMP_FEED_URL.to_string()
}

fn default_image_url() -> String {
    WELLCAMP_IMAGE_URL.to_string()
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            image_url: default_image_url(),
        }
    }
}

impl StationConfig {
    /// The feed/image pair handed to the pipeline
    pub fn source(&self) -> ObservationSource {
        ObservationSource::new(&self.feed_url, &self.image_url)
    }
}
