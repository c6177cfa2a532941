//! BOM HTTP client
//!
//! Fetches observation feeds and downloads snapshot images. URLs are passed
//! per call; the client only carries transport settings.

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use futures::StreamExt;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::models::FeedEnvelope;

/// BOM client errors
#[derive(Debug, Error)]
pub enum BomError {
    /// The HTTP client could not be built
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The request could not be sent or was rejected
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Upstream answered with a server error
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The body was not a feed document
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A download exceeded the configured size limit
    #[error("Payload exceeds {limit} bytes")]
    PayloadTooLarge {
        /// Configured limit
        limit: usize,
    },
}

/// BOM client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomConfig {
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    ///
    /// The BOM web servers reject requests without one.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Largest accepted image download in bytes (default: 10 MiB)
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
}

const fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("weather-indexer/", env!("CARGO_PKG_VERSION")).to_string()
}

const fn default_max_image_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for BomConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

/// Observation feed and image client
#[async_trait]
pub trait ObservationClient: Send + Sync {
    /// Fetch the feed and return its records, freshest first
    async fn fetch_observations(&self, feed_url: &str)
    -> Result<Vec<Map<String, Value>>, BomError>;

    /// Download raw bytes, typically a snapshot image
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, BomError>;
}

/// reqwest-backed BOM client
#[derive(Debug, Clone)]
pub struct BomClient {
    client: Client,
    config: BomConfig,
}

impl BomClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: BomConfig) -> Result<Self, BomError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| BomError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create a new client with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_defaults() -> Result<Self, BomError> {
        Self::new(BomConfig::default())
    }

    /// Active configuration
    pub const fn config(&self) -> &BomConfig {
        &self.config
    }

    async fn get(&self, url: &str) -> Result<Response, BomError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BomError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(BomError::ServiceUnavailable(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(BomError::RequestFailed(format!("HTTP {status}")));
        }
        Ok(response)
    }
}

#[async_trait]
impl ObservationClient for BomClient {
    #[instrument(skip(self))]
    async fn fetch_observations(
        &self,
        feed_url: &str,
    ) -> Result<Vec<Map<String, Value>>, BomError> {
        let response = self.get(feed_url).await?;

        let envelope: FeedEnvelope = response
            .json()
            .await
            .map_err(|e| BomError::ParseError(e.to_string()))?;

        debug!(
            station = envelope.station_name().unwrap_or("unknown"),
            records = envelope.observations.data.len(),
            "Feed decoded"
        );
        Ok(envelope.into_records())
    }

    #[instrument(skip(self))]
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, BomError> {
        let response = self.get(url).await?;
        let limit = self.config.max_image_bytes;

        let declared_limit = u64::try_from(limit).unwrap_or(u64::MAX);
        if response.content_length().is_some_and(|len| len > declared_limit) {
            return Err(BomError::PayloadTooLarge { limit });
        }

        let mut buffer = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| BomError::RequestFailed(e.to_string()))?;
            if buffer.len() + chunk.len() > limit {
                return Err(BomError::PayloadTooLarge { limit });
            }
            buffer.extend_from_slice(&chunk);
        }

        debug!(bytes = buffer.len(), "Download complete");
        Ok(buffer.to_vec())
    }
}
