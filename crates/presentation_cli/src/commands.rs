//! Command implementations
//!
//! Each command builds the adapters it needs from `AppConfig` and drives the
//! application services.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use application::{
    CollectionStatus, ConditionsReport, DocumentStorePort, ExportFormat, ExportService,
    IngestService, ObservationEnricher,
};
use domain::{ObservationSchema, field};
use infrastructure::{
    AppConfig, BomAdapter, INGEST_CYCLE_TASK, InMemoryDocumentStore, SchedulerConfig,
    SearchStoreAdapter, TaskEvent, TaskOutcome, TaskScheduler, create_ingest_cycle_task,
};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Longest image prefix shown by `once --dry-run`
const IMAGE_PREVIEW_CHARS: usize = 32;

fn bom_adapter(config: &AppConfig) -> anyhow::Result<Arc<BomAdapter>> {
    Ok(Arc::new(BomAdapter::with_config(config.http.clone())?))
}

fn search_store(config: &AppConfig) -> anyhow::Result<Arc<SearchStoreAdapter>> {
    Ok(Arc::new(SearchStoreAdapter::with_config(
        config.store.to_search_config(),
    )?))
}

fn enricher(config: &AppConfig) -> anyhow::Result<ObservationEnricher> {
    let bom = bom_adapter(config)?;
    Ok(ObservationEnricher::new(bom.clone(), bom))
}

/// Log whether the store answers; never fatal
async fn check_store(store: &dyn DocumentStorePort, url: &str) -> bool {
    let available = store.is_available().await;
    if available {
        info!(url, "Document store reachable");
    } else {
        warn!(url, "Document store not reachable, cycles will fail until it is");
    }
    available
}

/// `run`: index once, then cycle on the configured schedule until Ctrl+C
pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let store = search_store(config)?;
    check_store(&*store, &config.store.url).await;

    let service = Arc::new(IngestService::new(
        enricher(config)?,
        store,
        config.store.index.clone(),
    ));
    if let Err(e) = service.ensure_collection().await {
        warn!(error = %e, "Index not ready, the first cycle will retry");
    }

    let source = config.station.source();
    if config.schedule.run_on_start {
        match service.run_cycle(&source).await {
            Ok(report) => debug!(key = %report.key, "Startup cycle finished"),
            Err(e) => warn!(stage = %e.stage(), error = %e, "Startup cycle failed"),
        }
    }

    let scheduler = TaskScheduler::new(SchedulerConfig::default()).await?;
    if let Some(mut events) = scheduler.take_event_receiver() {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                log_event(&event);
            }
        });
    }

    let task = create_ingest_cycle_task(Arc::clone(&service), source);
    let grace = config.schedule.misfire_grace();
    match &config.schedule.cron {
        Some(expression) => {
            scheduler
                .add_cron_task(INGEST_CYCLE_TASK, expression, grace, task)
                .await?;
        },
        None => {
            scheduler
                .add_interval_task(INGEST_CYCLE_TASK, config.schedule.interval(), grace, task)
                .await?;
        },
    }

    info!(index = %config.store.index, "Indexer running, press Ctrl+C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    info!("Shutting down");
    scheduler.stop().await?;
    if let Some(stats) = scheduler.get_task_stats(INGEST_CYCLE_TASK) {
        info!(
            succeeded = stats.success_count,
            failed = stats.failure_count,
            skipped = stats.skipped_count,
            avg_duration_ms = stats.avg_duration_ms,
            "Cycle statistics"
        );
    }
    Ok(())
}

fn log_event(event: &TaskEvent) {
    match event.outcome {
        TaskOutcome::Succeeded => {
            debug!(task = %event.task_name, duration_ms = event.duration_ms, "Cycle succeeded");
        },
        TaskOutcome::Failed => debug!(
            task = %event.task_name,
            error = event.error.as_deref().unwrap_or_default(),
            "Cycle failed"
        ),
        TaskOutcome::Skipped => info!(task = %event.task_name, "Cycle skipped as misfire"),
    }
}

/// `once`: a single cycle against the configured store, or in memory
pub async fn once(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let source = config.station.source();
    let index = config.store.index.clone();

    if dry_run {
        let store = Arc::new(InMemoryDocumentStore::new());
        let service = IngestService::new(enricher(config)?, store.clone(), index.clone());
        let report = service.run_cycle(&source).await?;

        let mut document = store
            .get(&index, report.key.as_str())
            .context("dry-run document missing after cycle")?;
        abbreviate_image(&mut document);
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    let store = search_store(config)?;
    check_store(&*store, &config.store.url).await;
    let service = IngestService::new(enricher(config)?, store, index);
    let report = service.run_cycle(&source).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Shorten `local_image_b64` to a preview with its full length
fn abbreviate_image(document: &mut Value) {
    let Some(slot) = document.get_mut(field::LOCAL_IMAGE_B64) else {
        return;
    };
    let Some(text) = slot.as_str() else {
        return;
    };
    if text.len() > IMAGE_PREVIEW_CHARS {
        let preview = text.chars().take(IMAGE_PREVIEW_CHARS).collect::<String>();
        *slot = Value::String(format!("{preview}... ({} chars)", text.len()));
    }
}

/// `show`: print the freshest observation as a conditions report
pub async fn show(config: &AppConfig) -> anyhow::Result<()> {
    let raw = enricher(config)?
        .fetch_latest(&config.station.feed_url)
        .await?;
    let report = ConditionsReport::from_raw(&raw)?;
    println!("{report}");
    Ok(())
}

/// `export`: dump stored documents to stdout or a file
pub async fn export(
    config: &AppConfig,
    format: ExportFormat,
    size: usize,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let store = search_store(config)?;
    let text = ExportService::new(store, config.store.index.clone())
        .export(format, size)
        .await?;

    match output {
        Some(path) => {
            tokio::fs::write(path, &text)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = text.len(), "Export written");
        },
        None => print!("{text}"),
    }
    Ok(())
}

/// `init-index`: create the index with the observation mappings
pub async fn init_index(config: &AppConfig) -> anyhow::Result<()> {
    let store = search_store(config)?;
    let status = store
        .ensure_collection(&config.store.index, &ObservationSchema::standard())
        .await?;

    match status {
        CollectionStatus::Created => println!("Created index {}", config.store.index),
        CollectionStatus::Existing => println!("Index {} already exists", config.store.index),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn abbreviate_long_image() {
        let image = "A".repeat(100);
        let mut doc = json!({"local_image_b64": image, "air_temp": 24.1});
        abbreviate_image(&mut doc);
        assert_eq!(
            doc["local_image_b64"],
            json!(format!("{}... (100 chars)", "A".repeat(32)))
        );
        assert_eq!(doc["air_temp"], json!(24.1));
    }

    #[test]
    fn abbreviate_keeps_short_image() {
        let mut doc = json!({"local_image_b64": "anBlZw=="});
        abbreviate_image(&mut doc);
        assert_eq!(doc["local_image_b64"], json!("anBlZw=="));

        let mut empty = json!({"local_image_b64": ""});
        abbreviate_image(&mut empty);
        assert_eq!(empty["local_image_b64"], json!(""));
    }

    #[test]
    fn abbreviate_ignores_missing_field() {
        let mut doc = json!({"air_temp": 24.1});
        abbreviate_image(&mut doc);
        assert_eq!(doc, json!({"air_temp": 24.1}));
    }

    #[tokio::test]
    async fn check_store_reports_outage() {
        let store = InMemoryDocumentStore::new();
        assert!(check_store(&store, "memory").await);
        store.set_available(false);
        assert!(!check_store(&store, "memory").await);
    }
}
