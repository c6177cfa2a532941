//! Application services - Use case implementations

mod conditions_report;
mod export_service;
mod image_fetcher;
mod ingest_service;
mod observation_enricher;

pub use conditions_report::ConditionsReport;
pub use export_service::{ExportFormat, ExportService, render_export};
pub use image_fetcher::{EncodedImage, ImageFetcher, encode_image};
pub use ingest_service::{CycleReport, IngestService};
pub use observation_enricher::ObservationEnricher;
