//! Property-based tests for domain value objects
//!
//! These tests use proptest to verify invariants across many random inputs.

use chrono::{DateTime, Datelike, NaiveDate, Timelike};
use domain::value_objects::{CompassPoint, StationTimestamp, wind_dir_to_angle};
use domain::{RawObservation, field};
use proptest::prelude::*;

// ============================================================================
// Compass Property Tests
// ============================================================================

mod compass_tests {
    use super::*;

    proptest! {
        #[test]
        fn angles_stay_within_circle(index in 0usize..16) {
            let point = CompassPoint::ALL[index];
            let angle = point.degrees();
            prop_assert!((0.0..360.0).contains(&angle));
            #[allow(clippy::cast_precision_loss)]
            let expected = index as f64 * 22.5;
            prop_assert!((angle - expected).abs() < f64::EPSILON);
        }

        #[test]
        fn arbitrary_strings_never_panic(label in ".*") {
            let angle = wind_dir_to_angle(Some(&label));
            if CompassPoint::from_label(&label).is_none() {
                prop_assert!(angle.is_none());
            } else {
                prop_assert!(angle.is_some());
            }
        }

        #[test]
        fn lowercase_labels_are_unknown(index in 0usize..16) {
            let label = CompassPoint::ALL[index].label().to_lowercase();
            prop_assert!(wind_dir_to_angle(Some(&label)).is_none());
        }
    }
}

// ============================================================================
// Station Timestamp Property Tests
// ============================================================================

mod station_timestamp_tests {
    use super::*;

    proptest! {
        #[test]
        fn epoch_millis_round_trips(
            year in 1970i32..2100,
            month in 1u32..=12,
            day in 1u32..=28,
            hour in 0u32..24,
            minute in 0u32..60,
            second in 0u32..60
        ) {
            let raw = format!("{year:04}{month:02}{day:02}{hour:02}{minute:02}{second:02}");
            let ts = StationTimestamp::parse(&raw).unwrap();
            let millis = ts.to_utc_epoch_millis();
            prop_assert_eq!(millis % 1000, 0);

            let back = DateTime::from_timestamp_millis(millis).unwrap().naive_utc();
            prop_assert_eq!(back.year(), year);
            prop_assert_eq!(back.month(), month);
            prop_assert_eq!(back.day(), day);
            prop_assert_eq!(back.hour(), hour);
            prop_assert_eq!(back.minute(), minute);
            prop_assert_eq!(back.second(), second);
        }

        #[test]
        fn station_string_round_trips(
            year in 1900i32..2100,
            ordinal in 1u32..=365,
            seconds in 0u32..86_400
        ) {
            let date = NaiveDate::from_yo_opt(year, ordinal).unwrap();
            let time = chrono::NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap();
            let ts = StationTimestamp::from_naive(date.and_time(time));
            let reparsed = StationTimestamp::parse(&ts.to_station_string()).unwrap();
            prop_assert_eq!(reparsed, ts);
        }

        #[test]
        fn wrong_length_is_rejected(raw in "[0-9]{0,13}|[0-9]{15,20}") {
            prop_assert!(StationTimestamp::parse(&raw).is_err());
        }
    }
}

// ============================================================================
// Enrichment Property Tests
// ============================================================================

mod enrichment_tests {
    use super::*;

    proptest! {
        #[test]
        fn sort_order_never_survives(sort_order in any::<i64>(), wind in "[A-Z]{0,4}") {
            let raw: RawObservation = serde_json::from_value(serde_json::json!({
                "sort_order": sort_order,
                "local_date_time_full": "20210215233000",
                "aifstime_utc": "20210215133000",
                "wind_dir": wind,
            }))
            .unwrap();

            let enrichment = raw.prepare().unwrap().with_image("");
            let json = serde_json::to_value(&enrichment.document).unwrap();
            prop_assert!(json.get(field::SORT_ORDER).is_none());
            prop_assert_eq!(enrichment.document.wind_angle, wind_dir_to_angle(Some(&wind)));
        }
    }
}
