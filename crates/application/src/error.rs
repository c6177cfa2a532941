//! Application-level errors

use domain::DomainError;
use std::fmt;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// The observation feed could not be fetched or decoded
    #[error("Observation source unavailable: {0}")]
    SourceUnavailable(String),

    /// The snapshot image could not be fetched
    #[error("Snapshot image unavailable: {0}")]
    ImageUnavailable(String),

    /// A required field was missing or malformed
    #[error("Parse error: {0}")]
    Parse(#[from] DomainError),

    /// The document store could not be reached
    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    /// The document store rejected a write
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Pipeline stage this error belongs to
    #[must_use]
    pub const fn stage(&self) -> CycleStage {
        match self {
            Self::SourceUnavailable(_) | Self::ImageUnavailable(_) => CycleStage::Fetch,
            Self::Parse(_) => CycleStage::Parse,
            Self::StoreUnavailable(_) | Self::WriteFailed(_) => CycleStage::Store,
            Self::Configuration(_) | Self::Internal(_) => CycleStage::Setup,
        }
    }

    /// Whether the next scheduled cycle can be expected to succeed
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable(_) | Self::StoreUnavailable(_) | Self::ImageUnavailable(_)
        )
    }
}

/// Stage of a fetch -> enrich -> store cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleStage {
    /// Fetching the feed or image
    Fetch,
    /// Validating and transforming the record
    Parse,
    /// Writing to the document store
    Store,
    /// Wiring and configuration
    Setup,
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Parse => write!(f, "parse"),
            Self::Store => write!(f, "store"),
            Self::Setup => write!(f, "setup"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_follow_taxonomy() {
        assert_eq!(
            ApplicationError::SourceUnavailable("HTTP 500".into()).stage(),
            CycleStage::Fetch
        );
        assert_eq!(
            ApplicationError::Parse(DomainError::MissingField("aifstime_utc".into())).stage(),
            CycleStage::Parse
        );
        assert_eq!(
            ApplicationError::WriteFailed("mapper_parsing_exception".into()).stage(),
            CycleStage::Store
        );
        assert_eq!(
            ApplicationError::StoreUnavailable("connection refused".into()).stage(),
            CycleStage::Store
        );
        assert_eq!(ApplicationError::Internal("x".into()).stage(), CycleStage::Setup);
    }

    #[test]
    fn domain_errors_convert() {
        let err: ApplicationError = DomainError::MissingField("wind_dir".into()).into();
        assert!(matches!(err, ApplicationError::Parse(_)));
        assert!(err.to_string().starts_with("Parse error"));
    }

    #[test]
    fn transient_errors() {
        assert!(ApplicationError::StoreUnavailable("down".into()).is_transient());
        assert!(!ApplicationError::WriteFailed("rejected".into()).is_transient());
        assert!(!ApplicationError::Configuration("bad".into()).is_transient());
    }

    #[test]
    fn stage_display() {
        assert_eq!(CycleStage::Fetch.to_string(), "fetch");
        assert_eq!(CycleStage::Store.to_string(), "store");
    }
}
