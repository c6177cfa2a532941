//! Current-conditions console report

use std::fmt;

use domain::{RawObservation, StationTimestamp, field};
use serde_json::Value;

use crate::error::ApplicationError;

const LABEL_WIDTH: usize = 25;

/// Human-readable view of the freshest observation
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionsReport {
    heading_time: String,
    rows: Vec<(String, String)>,
}

impl ConditionsReport {
    /// Build the report from a raw record, in published field order
    pub fn from_raw(raw: &RawObservation) -> Result<Self, ApplicationError> {
        let local = StationTimestamp::parse(raw.local_date_time_full()?)?;

        let rows = raw
            .fields()
            .iter()
            .filter(|(name, _)| name.as_str() != field::SORT_ORDER)
            .map(|(name, value)| (name.clone(), render_value(value)))
            .collect();

        Ok(Self {
            heading_time: local.to_local_display(),
            rows,
        })
    }

    /// Local display time used in the heading
    pub fn heading_time(&self) -> &str {
        &self.heading_time
    }

    /// `(field, value)` rows
    pub fn rows(&self) -> &[(String, String)] {
        &self.rows
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for ConditionsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<LABEL_WIDTH$}{}",
            "Current Local Conditions", self.heading_time
        )?;
        for (name, value) in &self.rows {
            writeln!(f, "{:<LABEL_WIDTH$}{value}", format!("{name}: "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw() -> RawObservation {
        serde_json::from_value(json!({
            "sort_order": 0,
            "name": "Toowoomba Airport",
            "local_date_time_full": "20210215133000",
            "apparent_t": 19.8,
            "gust_kmh": null,
        }))
        .unwrap()
    }

    #[test]
    fn heading_uses_local_display_time() {
        let report = ConditionsReport::from_raw(&raw()).unwrap();
        assert_eq!(report.heading_time(), "Monday, 15 February 2021 13:30:00");

        let text = report.to_string();
        let first = text.lines().next().unwrap();
        assert_eq!(
            first,
            "Current Local Conditions Monday, 15 February 2021 13:30:00"
        );
    }

    #[test]
    fn sort_order_is_not_printed() {
        let report = ConditionsReport::from_raw(&raw()).unwrap();
        assert!(report.rows().iter().all(|(name, _)| name != "sort_order"));
        assert!(!report.to_string().contains("sort_order"));
    }

    #[test]
    fn rows_are_padded_to_label_width() {
        let text = ConditionsReport::from_raw(&raw()).unwrap().to_string();
        assert!(text.contains(&format!("{:<25}Toowoomba Airport", "name: ")));
        assert!(text.contains(&format!("{:<25}19.8", "apparent_t: ")));
        assert!(text.contains(&format!("{:<25}-", "gust_kmh: ")));
    }

    #[test]
    fn missing_timestamp_is_parse_error() {
        let raw: RawObservation = serde_json::from_value(json!({"name": "x"})).unwrap();
        let err = ConditionsReport::from_raw(&raw).unwrap_err();
        assert!(matches!(err, ApplicationError::Parse(_)));
    }
}
