//! Elasticsearch HTTP client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::models::{
    ClusterInfo, DocumentWrite, ErrorResponse, IndexCreation, IndexResponse, SearchHit,
    SearchQuery, SearchResponse,
};

const ALREADY_EXISTS: &str = "resource_already_exists_exception";

/// Elasticsearch client errors
#[derive(Debug, Error)]
pub enum SearchError {
    /// The HTTP client could not be built or the URL is unusable
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The request could not be sent
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The cluster answered with a server error
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Credentials were missing or rejected
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The index does not exist
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// The cluster rejected the request
    #[error("Rejected ({status}): {reason}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Error type and reason reported by the cluster
        reason: String,
    },

    /// The response body could not be decoded
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl SearchError {
    /// Whether the cluster could not be reached at all
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::RequestFailed(_) | Self::ServiceUnavailable(_)
        )
    }
}

/// Elasticsearch connection settings
#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Cluster URL (default: <http://localhost:9200>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Basic auth user
    #[serde(default)]
    pub username: Option<String>,

    /// Basic auth password
    #[serde(default, skip_serializing)]
    pub password: Option<SecretString>,

    /// Primary shards for newly created indices (default: 1)
    #[serde(default = "default_shards")]
    pub number_of_shards: u32,

    /// Replicas for newly created indices (default: 0)
    #[serde(default)]
    pub number_of_replicas: u32,
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("username", &self.username)
            .field(
                "password",
                &if self.password.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("number_of_shards", &self.number_of_shards)
            .field("number_of_replicas", &self.number_of_replicas)
            .finish()
    }
}

fn default_base_url() -> String {
    "http://localhost:9200".to_string()
}

const fn default_timeout() -> u64 {
    30
}

const fn default_shards() -> u32 {
    1
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            username: None,
            password: None,
            number_of_shards: default_shards(),
            number_of_replicas: 0,
        }
    }
}

/// Index operations used by the indexer
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// `GET /`
    async fn ping(&self) -> Result<ClusterInfo, SearchError>;

    /// `HEAD /{index}`
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError>;

    /// `PUT /{index}` with configured settings and the given mappings
    async fn create_index(&self, index: &str, mappings: &Value)
    -> Result<IndexCreation, SearchError>;

    /// `PUT /{index}/_doc/{id}`: insert or fully replace
    async fn put_document(
        &self,
        index: &str,
        id: &str,
        document: &Value,
    ) -> Result<DocumentWrite, SearchError>;

    /// `POST /{index}/_search`
    async fn search(&self, index: &str, query: &SearchQuery)
    -> Result<Vec<SearchHit>, SearchError>;
}

/// reqwest-backed Elasticsearch client
#[derive(Debug, Clone)]
pub struct ElasticsearchClient {
    client: Client,
    base_url: Url,
    config: SearchConfig,
}

impl ElasticsearchClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be initialized.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SearchError::ConnectionFailed(format!("invalid base URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(SearchError::ConnectionFailed(format!(
                "invalid base URL: {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SearchError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Build `{base}/{segments...}` with each segment percent-encoded
    fn url(&self, segments: &[&str]) -> Result<Url, SearchError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                SearchError::ConnectionFailed(format!("invalid base URL: {}", self.base_url))
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.config.username {
            Some(user) => request.basic_auth(
                user,
                self.config.password.as_ref().map(|p| p.expose_secret().to_string()),
            ),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, SearchError> {
        request
            .send()
            .await
            .map_err(|e| SearchError::RequestFailed(e.to_string()))
    }

    /// Map a non-success response to an error
    async fn failure(response: Response, index: &str) -> SearchError {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return SearchError::AuthenticationFailed;
        }
        if status.is_server_error() {
            return SearchError::ServiceUnavailable(format!("HTTP {status}"));
        }

        let body = response.text().await.unwrap_or_default();
        let cause = serde_json::from_str::<ErrorResponse>(&body).ok();
        if status == StatusCode::NOT_FOUND
            && cause
                .as_ref()
                .is_none_or(|c| c.error.kind == "index_not_found_exception")
        {
            return SearchError::IndexNotFound(index.to_string());
        }

        let reason = cause.map_or(body, |c| format!("{}: {}", c.error.kind, c.error.reason));
        SearchError::Rejected {
            status: status.as_u16(),
            reason,
        }
    }
}

#[async_trait]
impl SearchClient for ElasticsearchClient {
    #[instrument(skip(self))]
    async fn ping(&self) -> Result<ClusterInfo, SearchError> {
        let response = self.send(self.request(Method::GET, self.url(&[])?)).await?;
        if !response.status().is_success() {
            return Err(Self::failure(response, "").await);
        }

        let info: ClusterInfo = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;
        debug!(cluster = %info.cluster_name, version = %info.version.number, "Cluster reachable");
        Ok(info)
    }

    #[instrument(skip(self))]
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        let response = self
            .send(self.request(Method::HEAD, self.url(&[index])?))
            .await?;
        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(Self::failure(response, index).await),
        }
    }

    #[instrument(skip(self, mappings))]
    async fn create_index(
        &self,
        index: &str,
        mappings: &Value,
    ) -> Result<IndexCreation, SearchError> {
        let body = json!({
            "settings": {
                "number_of_shards": self.config.number_of_shards,
                "number_of_replicas": self.config.number_of_replicas,
            },
            "mappings": mappings,
        });

        let response = self
            .send(self.request(Method::PUT, self.url(&[index])?).json(&body))
            .await?;
        if response.status().is_success() {
            debug!("Index created");
            return Ok(IndexCreation::Created);
        }

        match Self::failure(response, index).await {
            SearchError::Rejected { reason, .. } if reason.starts_with(ALREADY_EXISTS) => {
                debug!("Index already exists");
                Ok(IndexCreation::AlreadyExists)
            }
            other => Err(other),
        }
    }

    #[instrument(skip(self, document))]
    async fn put_document(
        &self,
        index: &str,
        id: &str,
        document: &Value,
    ) -> Result<DocumentWrite, SearchError> {
        let response = self
            .send(
                self.request(Method::PUT, self.url(&[index, "_doc", id])?)
                    .json(document),
            )
            .await?;
        if !response.status().is_success() {
            return Err(Self::failure(response, index).await);
        }

        let written: IndexResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;
        debug!(id = %written.id, version = written.version, result = %written.result, "Document written");

        match written.result.as_str() {
            "created" => Ok(DocumentWrite::Created),
            "updated" | "noop" => Ok(DocumentWrite::Updated),
            other => Err(SearchError::ParseError(format!(
                "unexpected write result '{other}'"
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn search(
        &self,
        index: &str,
        query: &SearchQuery,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .send(
                self.request(Method::POST, self.url(&[index, "_search"])?)
                    .json(&query.to_body()),
            )
            .await?;
        if !response.status().is_success() {
            return Err(Self::failure(response, index).await);
        }

        let result: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;
        debug!(hits = result.hits.hits.len(), "Search complete");
        Ok(result.hits.hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> ElasticsearchClient {
        ElasticsearchClient::new(SearchConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn config_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.base_url, "http://localhost:9200");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.number_of_shards, 1);
        assert_eq!(config.number_of_replicas, 0);
        assert!(config.password.is_none());
    }

    #[test]
    fn debug_redacts_password() {
        let config = SearchConfig {
            username: Some("elastic".into()),
            password: Some(SecretString::from("hunter2")),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn password_is_never_serialized() {
        let config = SearchConfig {
            password: Some(SecretString::from("hunter2")),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn document_urls_are_encoded() {
        let c = client("http://localhost:9200/");
        let url = c.url(&["weather_index", "_doc", "2021/02 15"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9200/weather_index/_doc/2021%2F02%2015"
        );
    }

    #[test]
    fn base_path_is_kept() {
        let c = client("http://proxy.local/es");
        let url = c.url(&["weather_index"]).unwrap();
        assert_eq!(url.as_str(), "http://proxy.local/es/weather_index");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = ElasticsearchClient::new(SearchConfig {
            base_url: "not a url".into(),
            ..Default::default()
        });
        assert!(matches!(result, Err(SearchError::ConnectionFailed(_))));
    }

    #[test]
    fn unavailable_classification() {
        assert!(SearchError::RequestFailed("refused".into()).is_unavailable());
        assert!(SearchError::ServiceUnavailable("HTTP 503".into()).is_unavailable());
        assert!(!SearchError::AuthenticationFailed.is_unavailable());
        assert!(
            !SearchError::Rejected {
                status: 400,
                reason: "x".into()
            }
            .is_unavailable()
        );
    }
}
