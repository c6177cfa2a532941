//! Application layer - Use cases and orchestration
//!
//! Contains the enrichment pipeline services and the port definitions they
//! drive. Adapters in the infrastructure layer implement the ports.

pub mod error;
pub mod ports;
pub mod services;

pub use error::{ApplicationError, CycleStage};
pub use ports::*;
pub use services::*;
