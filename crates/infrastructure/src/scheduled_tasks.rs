//! Factory functions for scheduled tasks
//!
//! Provides task closures for the scheduler to run. The only recurring job
//! is the ingest cycle, fired on the configured interval or cron schedule.

use std::sync::Arc;

use application::services::IngestService;
use domain::ObservationSource;
use futures::future::BoxFuture;
use tracing::{debug, error};

/// Task name for the ingest cycle
pub const INGEST_CYCLE_TASK: &str = "ingest_cycle";

/// Create an ingest cycle task closure
///
/// Each fire runs one full fetch, enrich and upsert cycle. Errors are logged
/// and reported to the scheduler; the next fire is unaffected.
pub fn create_ingest_cycle_task(
    service: Arc<IngestService>,
    source: ObservationSource,
) -> impl Fn() -> BoxFuture<'static, Result<(), String>> + Send + Sync + 'static {
    move || {
        let service = Arc::clone(&service);
        let source = source.clone();

        Box::pin(async move {
            debug!(feed_url = %source.feed_url, "Running scheduled ingest cycle");

            match service.run_cycle(&source).await {
                Ok(report) => {
                    debug!(key = %report.key, outcome = %report.outcome, "Scheduled cycle finished");
                    Ok(())
                },
                Err(e) => {
                    error!(stage = %e.stage(), error = %e, "Scheduled ingest cycle failed");
                    Err(format!("Ingest cycle failed at {}: {e}", e.stage()))
                },
            }
        })
    }
}
