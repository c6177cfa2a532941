//! Snapshot image fetching and encoding
//!
//! Image enrichment is best effort: a failed download is logged and turns
//! into an empty `local_image_b64` instead of failing the cycle.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::{debug, instrument, warn};

use crate::ports::ImageSourcePort;

/// Outcome of fetching and encoding a snapshot image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedImage {
    /// Base64 text of the downloaded bytes
    Encoded(String),
    /// The image could not be fetched
    Unavailable {
        /// Why the fetch failed
        reason: String,
    },
}

impl EncodedImage {
    /// Whether an image was fetched
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Encoded(_))
    }

    /// Text form stored in the document; empty when unavailable
    #[must_use]
    pub fn as_text(&self) -> &str {
        match self {
            Self::Encoded(text) => text,
            Self::Unavailable { .. } => "",
        }
    }

    /// Consume into the stored text form
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Encoded(text) => text,
            Self::Unavailable { .. } => String::new(),
        }
    }
}

/// Standard padded base64 of arbitrary bytes
#[must_use]
pub fn encode_image(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Fetches snapshot images and encodes them as base64 text
#[derive(Clone)]
pub struct ImageFetcher {
    source: Arc<dyn ImageSourcePort>,
}

impl std::fmt::Debug for ImageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFetcher").finish_non_exhaustive()
    }
}

impl ImageFetcher {
    /// Create a fetcher over an image source
    pub fn new(source: Arc<dyn ImageSourcePort>) -> Self {
        Self { source }
    }

    /// Download `url` and encode the body; never fails
    #[instrument(skip(self))]
    pub async fn fetch_and_encode(&self, url: &str) -> EncodedImage {
        match self.source.fetch_image(url).await {
            Ok(bytes) => {
                debug!(bytes = bytes.len(), "Encoding snapshot image");
                EncodedImage::Encoded(encode_image(&bytes))
            },
            Err(e) => {
                warn!(url = %url, error = %e, "Snapshot image unavailable, continuing without it");
                EncodedImage::Unavailable {
                    reason: e.to_string(),
                }
            },
        }
    }
}
