//! Observation feed port
//!
//! Defines the interface for retrieving the station's observation sequence.

use async_trait::async_trait;
use domain::RawObservation;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for the upstream observation feed
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObservationFeedPort: Send + Sync {
    /// Fetch the feed's `observations.data` sequence, freshest first
    ///
    /// Any failure (network, non-success status, undecodable body) is
    /// reported as `ApplicationError::SourceUnavailable`.
    async fn fetch_observations(
        &self,
        feed_url: &str,
    ) -> Result<Vec<RawObservation>, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn ObservationFeedPort) {}

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn ObservationFeedPort>();
    }
}
