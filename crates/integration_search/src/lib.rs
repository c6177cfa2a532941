//! Elasticsearch integration
//!
//! Minimal REST client for the handful of index operations the indexer
//! needs: ping, index creation, keyed document writes and searches.

pub mod client;
mod models;

pub use client::{ElasticsearchClient, SearchClient, SearchConfig, SearchError};
pub use models::{
    ClusterInfo, ClusterVersion, DocumentWrite, IndexCreation, SearchHit, SearchQuery,
};
