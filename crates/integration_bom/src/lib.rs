//! Bureau of Meteorology integration
//!
//! Client for the BOM station observation feeds
//! (e.g. <http://www.bom.gov.au/fwo/IDQ60801/IDQ60801.99435.json>) and for
//! the airport camera snapshots that accompany them.

pub mod client;
mod models;

pub use client::{BomClient, BomConfig, BomError, ObservationClient};
pub use models::{FeedEnvelope, FeedHeader, FeedObservations};
