//! Value Objects - Immutable, identity-less domain primitives

mod compass_point;
mod observation_key;
mod station_timestamp;

pub use compass_point::{CompassPoint, wind_dir_to_angle};
pub use observation_key::ObservationKey;
pub use station_timestamp::{StationTimestamp, to_local_display, to_utc_epoch_millis};
