//! Station source URLs

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Feed URL for Toowoomba Wellcamp Airport (WMO 99435)
pub const WELLCAMP_FEED_URL: &str = "http://www.bom.gov.au/fwo/IDQ60801/IDQ60801.99435.json";
/// Airservices weather camera snapshot for Wellcamp
pub const WELLCAMP_IMAGE_URL: &str =
    "https://weathercams.airservicesaustralia.com/wp-content/uploads/airports/041529/041529_045.jpg";

/// Where one station's observations and snapshot image come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationSource {
    /// JSON observation feed
    pub feed_url: String,
    /// Snapshot image
    pub image_url: String,
}

impl ObservationSource {
    /// Create a source from two URLs
    #[must_use]
    pub fn new(feed_url: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
            image_url: image_url.into(),
        }
    }

    /// Check that both URLs are present and HTTP(S)
    pub fn validate(&self) -> Result<(), DomainError> {
        for (name, url) in [("feed_url", &self.feed_url), ("image_url", &self.image_url)] {
            if url.trim().is_empty() {
                return Err(DomainError::ValidationError(format!("{name} is empty")));
            }
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(DomainError::ValidationError(format!(
                    "{name} must be an http(s) URL: {url}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for ObservationSource {
    fn default() -> Self {
        Self::new(WELLCAMP_FEED_URL, WELLCAMP_IMAGE_URL)
    }
}
