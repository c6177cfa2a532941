//! Domain layer for the weather indexer
//!
//! Contains the observation entities, the compass and station timestamp
//! value objects, the index schema and domain errors.
//! This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod schema;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use schema::{FieldType, ObservationSchema};
pub use value_objects::*;
