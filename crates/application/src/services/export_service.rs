//! Export of stored observations
//!
//! Two text formats: a tab-separated summary and a bulk re-index script
//! that replays every document into an index of the same name.

use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::Arc;

use domain::field;
use serde_json::Value;
use tracing::{info, instrument};

use crate::error::ApplicationError;
use crate::ports::{DocumentStorePort, StoredDocument};

/// Output format for [`ExportService::export`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// `id`, `UTC time`, `apparent_t` columns
    #[default]
    Tsv,
    /// `POST /{index}/_doc/{id}` followed by the JSON body
    Bulk,
}

impl FromStr for ExportFormat {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tsv" => Ok(Self::Tsv),
            "bulk" => Ok(Self::Bulk),
            other => Err(ApplicationError::Configuration(format!(
                "unknown export format '{other}', expected 'tsv' or 'bulk'"
            ))),
        }
    }
}

const TSV_HEADER: [&str; 3] = ["id", "UTC time", "apparent_t"];

/// Render documents in the requested format
pub fn render_export(collection: &str, documents: &[StoredDocument], format: ExportFormat) -> String {
    match format {
        ExportFormat::Tsv => render_tsv(documents),
        ExportFormat::Bulk => render_bulk(collection, documents),
    }
}

fn render_tsv(documents: &[StoredDocument]) -> String {
    let mut out = TSV_HEADER.join("\t");
    out.push('\n');
    for doc in documents {
        let utc = tsv_cell(doc.source.get(field::AIFSTIME_UTC));
        let apparent = tsv_cell(doc.source.get("apparent_t"));
        let _ = writeln!(out, "{}\t{utc}\t{apparent}", sanitize(&doc.key));
    }
    out
}

fn tsv_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => sanitize(s),
        Some(other) => other.to_string(),
    }
}

fn sanitize(text: &str) -> String {
    text.replace(['\n', '\t', '\r'], " ")
}

fn render_bulk(collection: &str, documents: &[StoredDocument]) -> String {
    let mut out = String::new();
    for doc in documents {
        let _ = writeln!(out, "POST /{collection}/_doc/{}", doc.key);
        let _ = writeln!(out, "{}", doc.source);
        out.push('\n');
    }
    out
}

/// Reads documents back out of the store
pub struct ExportService {
    store: Arc<dyn DocumentStorePort>,
    collection: String,
}

impl std::fmt::Debug for ExportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportService")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

impl ExportService {
    pub fn new(store: Arc<dyn DocumentStorePort>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Fetch up to `limit` documents and render them
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn export(
        &self,
        format: ExportFormat,
        limit: usize,
    ) -> Result<String, ApplicationError> {
        let documents = self.store.fetch_documents(&self.collection, limit).await?;
        info!(count = documents.len(), ?format, "Exporting documents");
        Ok(render_export(&self.collection, &documents, format))
    }
}
