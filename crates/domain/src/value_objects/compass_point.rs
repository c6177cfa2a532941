//! Compass point value object
//!
//! Maps the 16-point wind direction labels published by the Bureau of
//! Meteorology to bearings in degrees.
//!
//! # Examples
//!
//! ```
//! use domain::value_objects::{CompassPoint, wind_dir_to_angle};
//!
//! assert_eq!(CompassPoint::from_label("SSW"), Some(CompassPoint::SouthSouthWest));
//! assert_eq!(wind_dir_to_angle(Some("E")), Some(90.0));
//! assert_eq!(wind_dir_to_angle(Some("CALM")), None);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the 16 standard compass points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassPoint {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "NNE")]
    NorthNorthEast,
    #[serde(rename = "NE")]
    NorthEast,
    #[serde(rename = "ENE")]
    EastNorthEast,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "ESE")]
    EastSouthEast,
    #[serde(rename = "SE")]
    SouthEast,
    #[serde(rename = "SSE")]
    SouthSouthEast,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "SSW")]
    SouthSouthWest,
    #[serde(rename = "SW")]
    SouthWest,
    #[serde(rename = "WSW")]
    WestSouthWest,
    #[serde(rename = "W")]
    West,
    #[serde(rename = "WNW")]
    WestNorthWest,
    #[serde(rename = "NW")]
    NorthWest,
    #[serde(rename = "NNW")]
    NorthNorthWest,
}

impl CompassPoint {
    /// Angular distance between two adjacent points
    pub const STEP_DEGREES: f64 = 22.5;

    /// All points, clockwise from north
    pub const ALL: [Self; 16] = [
        Self::North,
        Self::NorthNorthEast,
        Self::NorthEast,
        Self::EastNorthEast,
        Self::East,
        Self::EastSouthEast,
        Self::SouthEast,
        Self::SouthSouthEast,
        Self::South,
        Self::SouthSouthWest,
        Self::SouthWest,
        Self::WestSouthWest,
        Self::West,
        Self::WestNorthWest,
        Self::NorthWest,
        Self::NorthNorthWest,
    ];

    /// Parse a feed label such as `"WSW"`
    ///
    /// Matching is exact; labels are upper case in the feed.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|point| point.label() == label)
    }

    /// The abbreviation used by the feed
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::North => "N",
            Self::NorthNorthEast => "NNE",
            Self::NorthEast => "NE",
            Self::EastNorthEast => "ENE",
            Self::East => "E",
            Self::EastSouthEast => "ESE",
            Self::SouthEast => "SE",
            Self::SouthSouthEast => "SSE",
            Self::South => "S",
            Self::SouthSouthWest => "SSW",
            Self::SouthWest => "SW",
            Self::WestSouthWest => "WSW",
            Self::West => "W",
            Self::WestNorthWest => "WNW",
            Self::NorthWest => "NW",
            Self::NorthNorthWest => "NNW",
        }
    }

    /// Bearing in degrees, clockwise from north
    #[must_use]
    pub fn degrees(self) -> f64 {
        f64::from(self.index()) * Self::STEP_DEGREES
    }

    const fn index(self) -> u8 {
        match self {
            Self::North => 0,
            Self::NorthNorthEast => 1,
            Self::NorthEast => 2,
            Self::EastNorthEast => 3,
            Self::East => 4,
            Self::EastSouthEast => 5,
            Self::SouthEast => 6,
            Self::SouthSouthEast => 7,
            Self::South => 8,
            Self::SouthSouthWest => 9,
            Self::SouthWest => 10,
            Self::WestSouthWest => 11,
            Self::West => 12,
            Self::WestNorthWest => 13,
            Self::NorthWest => 14,
            Self::NorthNorthWest => 15,
        }
    }
}

impl fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Convert a `wind_dir` label to an angle in degrees
///
/// Total over its input: unknown labels (`"CALM"`, `""`) and a missing
/// label yield `None`.
#[must_use]
pub fn wind_dir_to_angle(label: Option<&str>) -> Option<f64> {
    label
        .and_then(CompassPoint::from_label)
        .map(CompassPoint::degrees)
}
