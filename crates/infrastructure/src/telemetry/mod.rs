//! Logging infrastructure
//!
//! Sets up the global `tracing` subscriber: an `EnvFilter` (overridable via
//! `RUST_LOG`) feeding either human-readable or JSON formatted output.

mod subscriber;

pub use subscriber::{TelemetryConfig, TelemetryError, init_telemetry};
