//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod bom_adapter;
mod in_memory_store;
mod search_store_adapter;

pub use bom_adapter::BomAdapter;
pub use in_memory_store::InMemoryDocumentStore;
pub use search_store_adapter::{SearchStoreAdapter, index_mappings};
