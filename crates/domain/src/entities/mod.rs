//! Domain entities

mod observation;
mod observation_source;

pub use observation::{
    EnrichedObservation, Enrichment, PreparedObservation, RawObservation, field,
};
pub use observation_source::{ObservationSource, WELLCAMP_FEED_URL, WELLCAMP_IMAGE_URL};
