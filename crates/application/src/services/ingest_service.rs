//! Ingest service
//!
//! One cycle = one feed fetch, at most one image fetch and exactly one
//! upsert. Re-running a cycle for the same observation replaces the stored
//! document under the same key.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use domain::{ObservationKey, ObservationSchema, ObservationSource};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::{CollectionStatus, DocumentStorePort, StoredOutcome};
use crate::services::ObservationEnricher;

/// Summary of a successful cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Key the document was stored under
    pub key: ObservationKey,
    /// Whether the write created or replaced
    pub outcome: StoredOutcome,
    /// Whether a snapshot image made it into the document
    pub image_included: bool,
    /// Wall-clock duration of the cycle
    pub duration_ms: u64,
}

/// Fetch -> enrich -> upsert pipeline
pub struct IngestService {
    enricher: ObservationEnricher,
    store: Arc<dyn DocumentStorePort>,
    collection: String,
    schema: ObservationSchema,
    collection_ready: AtomicBool,
}

impl std::fmt::Debug for IngestService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestService")
            .field("enricher", &self.enricher)
            .field("collection", &self.collection)
            .field("collection_ready", &self.collection_ready)
            .finish_non_exhaustive()
    }
}

impl IngestService {
    /// Create a new ingest service writing into `collection`
    pub fn new(
        enricher: ObservationEnricher,
        store: Arc<dyn DocumentStorePort>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            enricher,
            store,
            collection: collection.into(),
            schema: ObservationSchema::standard(),
            collection_ready: AtomicBool::new(false),
        }
    }

    /// Name of the target collection
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Make sure the collection exists with the observation schema
    ///
    /// Checked at most once per process; later calls return without
    /// touching the store.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn ensure_collection(&self) -> Result<(), ApplicationError> {
        if self.collection_ready.load(Ordering::Acquire) {
            return Ok(());
        }

        let status = self
            .store
            .ensure_collection(&self.collection, &self.schema)
            .await?;
        match status {
            CollectionStatus::Created => info!("Collection created with observation schema"),
            CollectionStatus::Existing => debug!("Collection already present"),
        }

        self.collection_ready.store(true, Ordering::Release);
        Ok(())
    }

    /// Run one complete cycle
    ///
    /// The document is enriched before the store is touched, so a feed
    /// failure results in no store calls at all.
    #[instrument(skip(self, source), fields(collection = %self.collection))]
    pub async fn run_cycle(
        &self,
        source: &ObservationSource,
    ) -> Result<CycleReport, ApplicationError> {
        let started = Instant::now();

        let enrichment = self.enricher.enrich(source).await.inspect_err(|e| {
            warn!(stage = %e.stage(), error = %e, "Cycle aborted before store");
        })?;

        self.ensure_collection().await?;

        let outcome = self
            .store
            .upsert(&self.collection, &enrichment.key, &enrichment.document)
            .await
            .inspect_err(|e| warn!(key = %enrichment.key, error = %e, "Upsert failed"))?;

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let report = CycleReport {
            image_included: enrichment.document.has_image(),
            key: enrichment.key,
            outcome,
            duration_ms,
        };

        info!(
            key = %report.key,
            outcome = %report.outcome,
            image_included = report.image_included,
            duration_ms,
            "Observation stored"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockDocumentStorePort, MockImageSourcePort, MockObservationFeedPort};
    use domain::RawObservation;
    use serde_json::json;

    fn raw(local: &str) -> RawObservation {
        serde_json::from_value(json!({
            "sort_order": 0,
            "name": "Toowoomba Airport",
            "local_date_time_full": local,
            "aifstime_utc": "20210215133000",
            "air_temp": 21.4,
            "wind_dir": "E",
        }))
        .unwrap()
    }

    fn source() -> ObservationSource {
        ObservationSource::new("http://feed/obs.json", "http://cam/snap.jpg")
    }

    fn enricher(
        feed: MockObservationFeedPort,
        images: MockImageSourcePort,
    ) -> ObservationEnricher {
        ObservationEnricher::new(Arc::new(feed), Arc::new(images))
    }

    fn healthy_feed() -> MockObservationFeedPort {
        let mut feed = MockObservationFeedPort::new();
        feed.expect_fetch_observations()
            .returning(|_| Ok(vec![raw("20210215233000")]));
        feed
    }

    fn healthy_images() -> MockImageSourcePort {
        let mut images = MockImageSourcePort::new();
        images.expect_fetch_image().returning(|_| Ok(vec![1, 2, 3]));
        images
    }

    #[tokio::test]
    async fn cycle_upserts_under_local_timestamp() {
        let mut store = MockDocumentStorePort::new();
        store
            .expect_ensure_collection()
            .times(1)
            .returning(|_, _| Ok(CollectionStatus::Created));
        store
            .expect_upsert()
            .times(1)
            .withf(|collection, key, doc| {
                collection == "weather_index"
                    && key.as_str() == "20210215233000"
                    && doc.epoch_date == 1_613_395_800_000
                    && doc.wind_angle == Some(90.0)
                    && doc.local_image_b64 == "AQID"
            })
            .returning(|_, _, _| Ok(StoredOutcome::Created));

        let service = IngestService::new(
            enricher(healthy_feed(), healthy_images()),
            Arc::new(store),
            "weather_index",
        );
        let report = service.run_cycle(&source()).await.unwrap();

        assert_eq!(report.key.as_str(), "20210215233000");
        assert_eq!(report.outcome, StoredOutcome::Created);
        assert!(report.image_included);
    }

    #[tokio::test]
    async fn collection_is_ensured_once() {
        let mut store = MockDocumentStorePort::new();
        store
            .expect_ensure_collection()
            .times(1)
            .returning(|_, _| Ok(CollectionStatus::Existing));
        store
            .expect_upsert()
            .times(2)
            .returning(|_, _, _| Ok(StoredOutcome::Replaced));

        let service = IngestService::new(
            enricher(healthy_feed(), healthy_images()),
            Arc::new(store),
            "weather_index",
        );
        service.run_cycle(&source()).await.unwrap();
        let report = service.run_cycle(&source()).await.unwrap();
        assert_eq!(report.outcome, StoredOutcome::Replaced);
    }

    #[tokio::test]
    async fn feed_failure_never_touches_store() {
        let mut feed = MockObservationFeedPort::new();
        feed.expect_fetch_observations()
            .returning(|_| Err(ApplicationError::SourceUnavailable("HTTP 500".into())));
        let mut images = MockImageSourcePort::new();
        images.expect_fetch_image().never();
        let mut store = MockDocumentStorePort::new();
        store.expect_ensure_collection().never();
        store.expect_upsert().never();

        let service = IngestService::new(enricher(feed, images), Arc::new(store), "weather_index");
        let err = service.run_cycle(&source()).await.unwrap_err();

        assert!(matches!(err, ApplicationError::SourceUnavailable(_)));
        assert_eq!(err.stage(), crate::CycleStage::Fetch);
    }

    #[tokio::test]
    async fn missing_image_still_stores_document() {
        let mut images = MockImageSourcePort::new();
        images
            .expect_fetch_image()
            .returning(|_| Err(ApplicationError::ImageUnavailable("timeout".into())));
        let mut store = MockDocumentStorePort::new();
        store
            .expect_ensure_collection()
            .returning(|_, _| Ok(CollectionStatus::Existing));
        store
            .expect_upsert()
            .times(1)
            .withf(|_, _, doc| doc.local_image_b64.is_empty() && doc.get("air_temp").is_some())
            .returning(|_, _, _| Ok(StoredOutcome::Created));

        let service = IngestService::new(enricher(healthy_feed(), images), Arc::new(store), "idx");
        let report = service.run_cycle(&source()).await.unwrap();
        assert!(!report.image_included);
    }

    #[tokio::test]
    async fn store_outage_is_reported_and_retried_next_cycle() {
        let mut store = MockDocumentStorePort::new();
        let mut seq = mockall::Sequence::new();
        store
            .expect_ensure_collection()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(ApplicationError::StoreUnavailable("connection refused".into())));
        store
            .expect_ensure_collection()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(CollectionStatus::Existing));
        store
            .expect_upsert()
            .times(1)
            .returning(|_, _, _| Ok(StoredOutcome::Created));

        let service = IngestService::new(
            enricher(healthy_feed(), healthy_images()),
            Arc::new(store),
            "weather_index",
        );

        let err = service.run_cycle(&source()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::StoreUnavailable(_)));
        assert!(err.is_transient());

        assert!(service.run_cycle(&source()).await.is_ok());
    }

    #[tokio::test]
    async fn write_rejection_propagates() {
        let mut store = MockDocumentStorePort::new();
        store
            .expect_ensure_collection()
            .returning(|_, _| Ok(CollectionStatus::Existing));
        store
            .expect_upsert()
            .returning(|_, _, _| Err(ApplicationError::WriteFailed("mapper_parsing_exception".into())));

        let service = IngestService::new(
            enricher(healthy_feed(), healthy_images()),
            Arc::new(store),
            "weather_index",
        );
        let err = service.run_cycle(&source()).await.unwrap_err();
        assert_eq!(err.stage(), crate::CycleStage::Store);
    }
}
