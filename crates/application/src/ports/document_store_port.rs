//! Document store port
//!
//! Keyed collection of enriched observations. Writes are upserts: an
//! existing key is fully replaced, never merged.

use async_trait::async_trait;
use domain::{EnrichedObservation, ObservationKey, ObservationSchema};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// What an upsert did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredOutcome {
    /// No document existed under the key
    Created,
    /// An existing document was replaced
    Replaced,
}

impl std::fmt::Display for StoredOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Replaced => write!(f, "replaced"),
        }
    }
}

/// Result of the collection precondition check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// Collection was already present
    Existing,
    /// Collection was created with the schema
    Created,
}

/// A stored document as returned for export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Document key
    pub key: String,
    /// Stored JSON body
    pub source: serde_json::Value,
}

/// Port for the document store
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DocumentStorePort: Send + Sync {
    /// Check whether the store answers
    async fn is_available(&self) -> bool;

    /// Create the collection with the schema unless it already exists
    ///
    /// Idempotent; a concurrent creation by another process counts as
    /// `CollectionStatus::Existing`.
    async fn ensure_collection(
        &self,
        collection: &str,
        schema: &ObservationSchema,
    ) -> Result<CollectionStatus, ApplicationError>;

    /// Insert or fully replace the document stored under `key`
    async fn upsert(
        &self,
        collection: &str,
        key: &ObservationKey,
        document: &EnrichedObservation,
    ) -> Result<StoredOutcome, ApplicationError>;

    /// Read up to `limit` stored documents, freshest first
    ///
    /// A collection that does not exist yet yields an empty list.
    async fn fetch_documents(
        &self,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<StoredDocument>, ApplicationError>;
}
