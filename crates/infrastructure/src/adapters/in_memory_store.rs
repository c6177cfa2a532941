//! In-memory document store
//!
//! Backs `once --dry-run` and pipeline tests. Collections must be ensured
//! before writes, mirroring the search store.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use application::error::ApplicationError;
use application::ports::{CollectionStatus, DocumentStorePort, StoredDocument, StoredOutcome};
use async_trait::async_trait;
use domain::{EnrichedObservation, ObservationKey, ObservationSchema, field};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

type Collection = BTreeMap<String, Value>;

/// Thread-safe in-memory document store
#[derive(Debug)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
    available: AtomicBool,
    ensure_calls: AtomicUsize,
    upsert_calls: AtomicUsize,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            ensure_calls: AtomicUsize::new(0),
            upsert_calls: AtomicUsize::new(0),
        }
    }

    /// Simulate an outage; every operation then fails with `StoreUnavailable`
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Stored document under `key`, if any
    pub fn get(&self, collection: &str, key: &str) -> Option<Value> {
        self.collections
            .read()
            .get(collection)
            .and_then(|c| c.get(key).cloned())
    }

    /// Number of documents in `collection`
    pub fn len(&self, collection: &str) -> usize {
        self.collections.read().get(collection).map_or(0, BTreeMap::len)
    }

    /// Whether `collection` holds no documents
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Number of `ensure_collection` calls so far
    pub fn ensure_calls(&self) -> usize {
        self.ensure_calls.load(Ordering::SeqCst)
    }

    /// Number of `upsert` calls so far
    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), ApplicationError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ApplicationError::StoreUnavailable(
                "in-memory store marked unavailable".into(),
            ))
        }
    }
}

#[async_trait]
impl DocumentStorePort for InMemoryDocumentStore {
    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn ensure_collection(
        &self,
        collection: &str,
        _schema: &ObservationSchema,
    ) -> Result<CollectionStatus, ApplicationError> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let mut collections = self.collections.write();
        if collections.contains_key(collection) {
            return Ok(CollectionStatus::Existing);
        }
        collections.insert(collection.to_string(), Collection::new());
        debug!(collection, "Collection created");
        Ok(CollectionStatus::Created)
    }

    async fn upsert(
        &self,
        collection: &str,
        key: &ObservationKey,
        document: &EnrichedObservation,
    ) -> Result<StoredOutcome, ApplicationError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let body = serde_json::to_value(document)
            .map_err(|e| ApplicationError::Internal(format!("document encoding: {e}")))?;

        let mut collections = self.collections.write();
        let docs = collections.get_mut(collection).ok_or_else(|| {
            ApplicationError::WriteFailed(format!("collection '{collection}' does not exist"))
        })?;

        Ok(match docs.insert(key.as_str().to_string(), body) {
            Some(_) => StoredOutcome::Replaced,
            None => StoredOutcome::Created,
        })
    }

    async fn fetch_documents(
        &self,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<StoredDocument>, ApplicationError> {
        self.check_available()?;

        let collections = self.collections.read();
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut documents: Vec<StoredDocument> = docs
            .iter()
            .map(|(key, source)| StoredDocument {
                key: key.clone(),
                source: source.clone(),
            })
            .collect();
        documents.sort_by_key(|d| {
            std::cmp::Reverse(d.source.get(field::EPOCH_DATE).and_then(Value::as_i64))
        });
        documents.truncate(limit);
        Ok(documents)
    }
}
