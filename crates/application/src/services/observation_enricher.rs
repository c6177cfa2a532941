//! Observation enrichment
//!
//! Turns the freshest record of the feed into an [`Enrichment`]: the
//! document plus the key it must be stored under. The key travels with the
//! document; nothing is kept between calls.

use std::sync::Arc;

use domain::{Enrichment, ObservationSource, RawObservation};
use tracing::{debug, info, instrument};

use crate::error::ApplicationError;
use crate::ports::{ImageSourcePort, ObservationFeedPort};
use crate::services::ImageFetcher;

/// Orchestrates feed fetch, validation, image fetch and merge
#[derive(Clone)]
pub struct ObservationEnricher {
    feed: Arc<dyn ObservationFeedPort>,
    images: ImageFetcher,
}

impl std::fmt::Debug for ObservationEnricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservationEnricher")
            .field("images", &self.images)
            .finish_non_exhaustive()
    }
}

impl ObservationEnricher {
    /// Create an enricher from its two sources
    pub fn new(feed: Arc<dyn ObservationFeedPort>, images: Arc<dyn ImageSourcePort>) -> Self {
        Self {
            feed,
            images: ImageFetcher::new(images),
        }
    }

    /// Fetch the freshest observation as published
    ///
    /// Element 0 of the feed's data sequence, by upstream convention; the
    /// sequence is not re-sorted.
    #[instrument(skip(self))]
    pub async fn fetch_latest(&self, feed_url: &str) -> Result<RawObservation, ApplicationError> {
        let observations = self
            .feed
            .fetch_observations(feed_url)
            .await
            .map_err(into_source_unavailable)?;

        debug!(count = observations.len(), "Feed fetched");

        observations.into_iter().next().ok_or_else(|| {
            ApplicationError::SourceUnavailable("feed contained no observations".to_string())
        })
    }

    /// Produce the enriched document and its key
    ///
    /// Performs exactly one feed fetch and, once the record has been
    /// validated, one image fetch. An image failure degrades to an empty
    /// `local_image_b64`; feed and timestamp failures abort.
    #[instrument(skip(self, source), fields(feed_url = %source.feed_url))]
    pub async fn enrich(&self, source: &ObservationSource) -> Result<Enrichment, ApplicationError> {
        let raw = self.fetch_latest(&source.feed_url).await?;
        let prepared = raw.prepare()?;

        let image = self.images.fetch_and_encode(&source.image_url).await;
        let image_included = image.is_available();
        let enrichment = prepared.with_image(image.into_text());

        info!(
            key = %enrichment.key,
            epoch_date = enrichment.document.epoch_date,
            wind_angle = ?enrichment.document.wind_angle,
            image_included,
            "Observation enriched"
        );
        Ok(enrichment)
    }
}

fn into_source_unavailable(err: ApplicationError) -> ApplicationError {
    match err {
        ApplicationError::SourceUnavailable(_) => err,
        other => ApplicationError::SourceUnavailable(other.to_string()),
    }
}
