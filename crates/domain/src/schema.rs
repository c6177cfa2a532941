//! Index schema for enriched observations
//!
//! Declares the field types the document store should apply so range and
//! match queries behave. Created once per collection, never per document.

use crate::entities::field;

/// Storage type of a document field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Whole number
    Integer,
    /// Floating point number
    Float,
    /// Analyzed full text
    Text,
    /// Exact-match string
    Keyword,
    /// Date with an explicit format, e.g. `epoch_millis`
    Date(&'static str),
}

/// Date format of the 14-digit station timestamps
pub const STATION_DATE_FORMAT: &str = "yyyyMMddHHmmss";
/// Date format of `epoch_date`
pub const EPOCH_MILLIS_FORMAT: &str = "epoch_millis";

const OBSERVATION_FIELDS: &[(&str, FieldType)] = &[
    ("wmo", FieldType::Integer),
    ("name", FieldType::Text),
    ("history_product", FieldType::Text),
    ("local_date_time", FieldType::Text),
    (field::LOCAL_DATE_TIME_FULL, FieldType::Date(STATION_DATE_FORMAT)),
    (field::AIFSTIME_UTC, FieldType::Date(STATION_DATE_FORMAT)),
    ("lat", FieldType::Float),
    ("lon", FieldType::Float),
    ("apparent_t", FieldType::Float),
    ("cloud", FieldType::Text),
    ("cloud_base_m", FieldType::Text),
    ("cloud_oktas", FieldType::Integer),
    ("cloud_type", FieldType::Text),
    ("cloud_type_id", FieldType::Text),
    ("delta_t", FieldType::Float),
    ("gust_kmh", FieldType::Integer),
    ("gust_kt", FieldType::Integer),
    ("air_temp", FieldType::Float),
    ("dewpt", FieldType::Float),
    ("press", FieldType::Float),
    ("press_msl", FieldType::Float),
    ("press_qnh", FieldType::Float),
    ("press_tend", FieldType::Text),
    ("rain_trace", FieldType::Float),
    ("rel_hum", FieldType::Integer),
    ("sea_state", FieldType::Text),
    ("swell_dir_worded", FieldType::Text),
    ("swell_height", FieldType::Text),
    ("swell_period", FieldType::Text),
    ("vis_km", FieldType::Text),
    ("weather", FieldType::Text),
    (field::WIND_DIR, FieldType::Keyword),
    ("wind_spd_kmh", FieldType::Integer),
    ("wind_spd_kt", FieldType::Integer),
    (field::EPOCH_DATE, FieldType::Date(EPOCH_MILLIS_FORMAT)),
    (field::WIND_ANGLE, FieldType::Float),
    (field::LOCAL_IMAGE_B64, FieldType::Text),
];

/// Typed field list for the observation collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationSchema {
    fields: Vec<(&'static str, FieldType)>,
}

impl ObservationSchema {
    /// Schema of the enriched observation document
    #[must_use]
    pub fn standard() -> Self {
        Self {
            fields: OBSERVATION_FIELDS.to_vec(),
        }
    }

    /// Declared fields in declaration order
    #[must_use]
    pub fn fields(&self) -> &[(&'static str, FieldType)] {
        &self.fields
    }

    /// Type of a single field
    #[must_use]
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields
            .iter()
            .find(|(field_name, _)| *field_name == name)
            .map(|(_, ty)| *ty)
    }
}

impl Default for ObservationSchema {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn derived_fields_are_declared() {
        let schema = ObservationSchema::standard();
        assert_eq!(
            schema.field_type("epoch_date"),
            Some(FieldType::Date("epoch_millis"))
        );
        assert_eq!(schema.field_type("wind_angle"), Some(FieldType::Float));
        assert_eq!(schema.field_type("local_image_b64"), Some(FieldType::Text));
    }

    #[test]
    fn sort_order_is_not_declared() {
        assert!(ObservationSchema::standard().field_type("sort_order").is_none());
    }

    #[test]
    fn field_names_are_unique() {
        let schema = ObservationSchema::standard();
        let names: HashSet<_> = schema.fields().iter().map(|(n, _)| *n).collect();
        assert_eq!(names.len(), schema.fields().len());
    }

    #[test]
    fn wind_dir_is_keyword() {
        assert_eq!(
            ObservationSchema::standard().field_type("wind_dir"),
            Some(FieldType::Keyword)
        );
    }
}
