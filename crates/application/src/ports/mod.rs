//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod document_store_port;
mod image_source_port;
mod observation_feed_port;

#[cfg(test)]
pub use document_store_port::MockDocumentStorePort;
pub use document_store_port::{
    CollectionStatus, DocumentStorePort, StoredDocument, StoredOutcome,
};
#[cfg(test)]
pub use image_source_port::MockImageSourcePort;
pub use image_source_port::ImageSourcePort;
#[cfg(test)]
pub use observation_feed_port::MockObservationFeedPort;
pub use observation_feed_port::ObservationFeedPort;
