//! BOM adapter - Implements the feed and image ports using integration_bom

use application::error::ApplicationError;
use application::ports::{ImageSourcePort, ObservationFeedPort};
use async_trait::async_trait;
use domain::RawObservation;
use integration_bom::{BomClient, BomConfig, BomError, ObservationClient};
use tracing::{debug, instrument};

/// Adapter for the BOM feed and camera snapshots
#[derive(Debug, Clone)]
pub struct BomAdapter {
    client: BomClient,
}

impl BomAdapter {
    /// Create with custom configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn with_config(config: BomConfig) -> Result<Self, ApplicationError> {
        let client =
            BomClient::new(config).map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self { client })
    }

    /// Map a feed error; every feed failure means the source is unavailable
    fn map_feed_error(err: BomError) -> ApplicationError {
        ApplicationError::SourceUnavailable(err.to_string())
    }

    fn map_image_error(err: BomError) -> ApplicationError {
        ApplicationError::ImageUnavailable(err.to_string())
    }
}

#[async_trait]
impl ObservationFeedPort for BomAdapter {
    #[instrument(skip(self))]
    async fn fetch_observations(
        &self,
        feed_url: &str,
    ) -> Result<Vec<RawObservation>, ApplicationError> {
        let records = self
            .client
            .fetch_observations(feed_url)
            .await
            .map_err(Self::map_feed_error)?;

        debug!(count = records.len(), "Observations received");
        Ok(records.into_iter().map(RawObservation::from).collect())
    }
}

#[async_trait]
impl ImageSourcePort for BomAdapter {
    #[instrument(skip(self))]
    async fn fetch_image(&self, image_url: &str) -> Result<Vec<u8>, ApplicationError> {
        self.client
            .fetch_bytes(image_url)
            .await
            .map_err(Self::map_image_error)
    }
}
