//! Snapshot image port

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for downloading the station snapshot image
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ImageSourcePort: Send + Sync {
    /// Download the full image body
    ///
    /// Failures are reported as `ApplicationError::ImageUnavailable`.
    async fn fetch_image(&self, image_url: &str) -> Result<Vec<u8>, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn ImageSourcePort>();
    }
}
