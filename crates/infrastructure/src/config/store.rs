//! Document store configuration

use integration_search::SearchConfig;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Elasticsearch connection and index settings
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Cluster URL
    #[serde(default = "default_url")]
    pub url: String,

    /// Target index
    #[serde(default = "default_index")]
    pub index: String,

    /// Basic auth user
    #[serde(default)]
    pub username: Option<String>,

    /// Basic auth password (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub password: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Primary shards when the index is created
    #[serde(default = "default_shards")]
    pub number_of_shards: u32,

    /// Replicas when the index is created
    #[serde(default)]
    pub number_of_replicas: u32,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("index", &self.index)
            .field("username", &self.username)
            .field(
                "password",
                &if self.password.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("timeout_secs", &self.timeout_secs)
            .field("number_of_shards", &self.number_of_shards)
            .field("number_of_replicas", &self.number_of_replicas)
            .finish()
    }
}

fn default_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_index() -> String {
    "weather_index".to_string()
}

const fn default_timeout() -> u64 {
    30
}

const fn default_shards() -> u32 {
    1
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            index: default_index(),
            username: None,
            password: None,
            timeout_secs: default_timeout(),
            number_of_shards: default_shards(),
            number_of_replicas: 0,
        }
    }
}

impl StoreConfig {
    /// Client settings for `integration_search`
    pub fn to_search_config(&self) -> SearchConfig {
        SearchConfig {
            base_url: self.url.clone(),
            timeout_secs: self.timeout_secs,
            username: self.username.clone(),
            password: self.password.clone(),
            number_of_shards: self.number_of_shards,
            number_of_replicas: self.number_of_replicas,
        }
    }
}
