//! Elasticsearch request and response models

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// `GET /` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterInfo {
    /// Node name
    #[serde(default)]
    pub name: String,
    /// Cluster name
    #[serde(default)]
    pub cluster_name: String,
    /// Version block
    #[serde(default)]
    pub version: ClusterVersion,
}

/// Version block of [`ClusterInfo`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterVersion {
    /// Version number, e.g. `8.12.0`
    #[serde(default)]
    pub number: String,
}

/// Result of an index creation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexCreation {
    /// The index was created
    Created,
    /// Another writer created it first
    AlreadyExists,
}

/// Result of a keyed document write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentWrite {
    /// New document
    Created,
    /// Existing document replaced
    Updated,
}

/// `PUT /{index}/_doc/{id}` response
#[derive(Debug, Deserialize)]
pub(crate) struct IndexResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub result: String,
    #[serde(rename = "_version", default)]
    pub version: u64,
}

/// Error body returned by Elasticsearch
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorCause,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorCause {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub reason: String,
}

/// `_search` response
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub hits: SearchHits,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchHits {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

/// A single search hit
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Stored document body
    #[serde(rename = "_source", default)]
    pub source: Value,
}

/// Match-all search with an optional descending sort field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Maximum number of hits
    pub size: usize,
    /// Field to sort on, newest first
    pub sort_desc: Option<String>,
}

impl SearchQuery {
    /// Match-all query returning up to `size` hits
    pub const fn match_all(size: usize) -> Self {
        Self {
            size,
            sort_desc: None,
        }
    }

    /// Sort descending on `field`
    #[must_use]
    pub fn sorted_desc(mut self, field: impl Into<String>) -> Self {
        self.sort_desc = Some(field.into());
        self
    }

    pub(crate) fn to_body(&self) -> Value {
        let mut body = json!({
            "size": self.size,
            "query": { "match_all": {} },
        });
        if let Some(field) = &self.sort_desc {
            body["sort"] = json!([{ field.as_str(): { "order": "desc", "unmapped_type": "long" } }]);
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_body_without_sort() {
        let body = SearchQuery::match_all(25).to_body();
        assert_eq!(body["size"], json!(25));
        assert!(body["query"]["match_all"].is_object());
        assert!(body.get("sort").is_none());
    }

    #[test]
    fn search_body_with_sort() {
        let body = SearchQuery::match_all(5).sorted_desc("epoch_date").to_body();
        assert_eq!(body["sort"][0]["epoch_date"]["order"], json!("desc"));
    }

    #[test]
    fn decodes_search_hits() {
        let response: SearchResponse = serde_json::from_value(json!({
            "took": 2,
            "hits": {
                "total": {"value": 1, "relation": "eq"},
                "hits": [{"_index": "weather_index", "_id": "20210215233000", "_source": {"air_temp": 18.9}}]
            }
        }))
        .unwrap();
        assert_eq!(response.hits.hits[0].id, "20210215233000");
        assert_eq!(response.hits.hits[0].source["air_temp"], json!(18.9));
    }

    #[test]
    fn decodes_error_body() {
        let err: ErrorResponse = serde_json::from_value(json!({
            "error": {"type": "resource_already_exists_exception", "reason": "index exists"},
            "status": 400
        }))
        .unwrap();
        assert_eq!(err.error.kind, "resource_already_exists_exception");
    }
}
