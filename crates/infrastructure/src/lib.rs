//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer.
//! Contains the BOM feed adapter, the Elasticsearch and in-memory document
//! stores, configuration loading, logging setup and the cycle scheduler.

pub mod adapters;
pub mod config;
pub mod scheduled_tasks;
pub mod scheduler;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, ConfigError, ScheduleConfig, StationConfig, StoreConfig};
pub use scheduled_tasks::{INGEST_CYCLE_TASK, create_ingest_cycle_task};
pub use scheduler::{SchedulerConfig, SchedulerError, TaskEvent, TaskOutcome, TaskScheduler};
pub use telemetry::{TelemetryConfig, TelemetryError, init_telemetry};
