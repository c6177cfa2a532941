//! Search store adapter - Implements DocumentStorePort using integration_search

use application::error::ApplicationError;
use application::ports::{CollectionStatus, DocumentStorePort, StoredDocument, StoredOutcome};
use async_trait::async_trait;
use domain::{EnrichedObservation, FieldType, ObservationKey, ObservationSchema, field};
use integration_search::{
    DocumentWrite, ElasticsearchClient, IndexCreation, SearchClient, SearchConfig, SearchError,
    SearchQuery,
};
use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument, warn};

/// Elasticsearch `mappings` body for a schema
pub fn index_mappings(schema: &ObservationSchema) -> Value {
    let properties: Map<String, Value> = schema
        .fields()
        .iter()
        .map(|(name, field_type)| ((*name).to_string(), field_mapping(*field_type)))
        .collect();
    json!({ "properties": properties })
}

fn field_mapping(field_type: FieldType) -> Value {
    match field_type {
        FieldType::Integer => json!({"type": "integer"}),
        FieldType::Float => json!({"type": "float"}),
        FieldType::Text => json!({"type": "text"}),
        FieldType::Keyword => json!({"type": "keyword"}),
        FieldType::Date(format) => json!({"type": "date", "format": format}),
    }
}

/// Document store backed by an Elasticsearch index
pub struct SearchStoreAdapter {
    client: Box<dyn SearchClient>,
}

impl std::fmt::Debug for SearchStoreAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchStoreAdapter")
            .field("client", &"SearchClient")
            .finish()
    }
}

impl SearchStoreAdapter {
    /// Create with custom configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to initialize.
    pub fn with_config(config: SearchConfig) -> Result<Self, ApplicationError> {
        let client = ElasticsearchClient::new(config)
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self::with_client(client))
    }

    /// Wrap an existing client
    pub fn with_client(client: impl SearchClient + 'static) -> Self {
        Self {
            client: Box::new(client),
        }
    }

    /// Map integration search error to application error
    fn map_error(err: SearchError) -> ApplicationError {
        if err.is_unavailable() {
            ApplicationError::StoreUnavailable(err.to_string())
        } else {
            ApplicationError::WriteFailed(err.to_string())
        }
    }
}

#[async_trait]
impl DocumentStorePort for SearchStoreAdapter {
    async fn is_available(&self) -> bool {
        match self.client.ping().await {
            Ok(info) => {
                debug!(cluster = %info.cluster_name, version = %info.version.number, "Store reachable");
                true
            },
            Err(e) => {
                warn!(error = %e, "Store ping failed");
                false
            },
        }
    }

    #[instrument(skip(self, schema))]
    async fn ensure_collection(
        &self,
        collection: &str,
        schema: &ObservationSchema,
    ) -> Result<CollectionStatus, ApplicationError> {
        if self
            .client
            .index_exists(collection)
            .await
            .map_err(Self::map_error)?
        {
            return Ok(CollectionStatus::Existing);
        }

        match self
            .client
            .create_index(collection, &index_mappings(schema))
            .await
            .map_err(Self::map_error)?
        {
            IndexCreation::Created => {
                info!(index = %collection, "Index created");
                Ok(CollectionStatus::Created)
            },
            IndexCreation::AlreadyExists => Ok(CollectionStatus::Existing),
        }
    }

    #[instrument(skip(self, document), fields(key = %key))]
    async fn upsert(
        &self,
        collection: &str,
        key: &ObservationKey,
        document: &EnrichedObservation,
    ) -> Result<StoredOutcome, ApplicationError> {
        let body = serde_json::to_value(document)
            .map_err(|e| ApplicationError::Internal(format!("document encoding: {e}")))?;

        let written = self
            .client
            .put_document(collection, key.as_str(), &body)
            .await
            .map_err(Self::map_error)?;

        Ok(match written {
            DocumentWrite::Created => StoredOutcome::Created,
            DocumentWrite::Updated => StoredOutcome::Replaced,
        })
    }

    #[instrument(skip(self))]
    async fn fetch_documents(
        &self,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<StoredDocument>, ApplicationError> {
        let query = SearchQuery::match_all(limit).sorted_desc(field::EPOCH_DATE);
        let hits = match self.client.search(collection, &query).await {
            Ok(hits) => hits,
            Err(SearchError::IndexNotFound(_)) => {
                debug!(index = %collection, "Index does not exist yet, nothing to export");
                return Ok(Vec::new());
            },
            Err(e) => return Err(Self::map_error(e)),
        };

        Ok(hits
            .into_iter()
            .map(|hit| StoredDocument {
                key: hit.id,
                source: hit.source,
            })
            .collect())
    }
}
