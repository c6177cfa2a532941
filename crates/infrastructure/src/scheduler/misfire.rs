//! Misfire detection for scheduled fires

use std::{fmt, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use croner::{
    Cron,
    errors::CronError,
    parser::{CronParser, Seconds},
};

/// Parse a six-field cron expression the way the job runner reads it
///
/// Seconds are required, day of week runs 0-6 with Sunday as 0 (7 is also
/// Sunday), and day-of-month and day-of-week must both match.
pub fn parse_cron(expression: &str) -> Result<Cron, CronError> {
    CronParser::builder()
        .seconds(Seconds::Required)
        .dom_and_dow(true)
        .build()
        .parse(expression)
}

/// When a task fires
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Fixed period, measured from the previous fire
    Interval {
        /// Period between fires
        every: Duration,
    },
    /// Six-field cron expression, evaluated in UTC
    Cron {
        /// Expression as configured
        expression: String,
        /// Parsed schedule
        schedule: Box<Cron>,
    },
}

impl Trigger {
    /// True when a fire starting at `started_at` is too late to run.
    ///
    /// `anchor` is the previous fire, or registration time for the first.
    pub(crate) fn is_misfire(
        &self,
        anchor: DateTime<Utc>,
        started_at: DateTime<Utc>,
        grace: Duration,
    ) -> bool {
        match self {
            Self::Interval { every } => {
                let elapsed = (started_at - anchor).to_std().unwrap_or_default();
                interval_lateness(elapsed, *every) > grace
            },
            Self::Cron { schedule, .. } => !cron_fired_within(schedule, started_at, grace),
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interval { every } => write!(f, "every {}s", every.as_secs()),
            Self::Cron { expression, .. } => write!(f, "cron '{expression}'"),
        }
    }
}

/// How far past its nearest due time a fire is.
///
/// Due times sit at whole multiples of `every` after the anchor. A fire that
/// lands before its due time has zero lateness.
pub fn interval_lateness(elapsed: Duration, every: Duration) -> Duration {
    let period = every.as_nanos();
    if period == 0 {
        return Duration::ZERO;
    }
    let elapsed_nanos = elapsed.as_nanos();
    let nearest = (elapsed_nanos + period / 2) / period * period;
    let late = elapsed_nanos.saturating_sub(nearest);
    Duration::from_nanos(u64::try_from(late).unwrap_or(u64::MAX))
}

/// True when `schedule` has a fire time in `(now - grace, now + 1s]`.
pub fn cron_fired_within(schedule: &Cron, now: DateTime<Utc>, grace: Duration) -> bool {
    let grace = TimeDelta::from_std(grace).unwrap_or(TimeDelta::MAX);
    let Some(window_start) = now.checked_sub_signed(grace) else {
        return true;
    };
    let window_end = now + TimeDelta::seconds(1);
    schedule
        .find_next_occurrence(&window_start, false)
        .is_ok_and(|next| next <= window_end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Weekday};

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn on_time_interval_fire_has_no_lateness() {
        assert_eq!(interval_lateness(secs(300), secs(300)), Duration::ZERO);
        assert_eq!(interval_lateness(secs(900), secs(300)), Duration::ZERO);
    }

    #[test]
    fn early_fire_has_no_lateness() {
        assert_eq!(
            interval_lateness(Duration::from_millis(299_600), secs(300)),
            Duration::ZERO
        );
    }

    #[test]
    fn late_fire_reports_lateness() {
        assert_eq!(interval_lateness(secs(305), secs(300)), secs(5));
        assert_eq!(interval_lateness(secs(601), secs(300)), secs(1));
    }

    #[test]
    fn interval_misfire_respects_grace() {
        let anchor = Utc.with_ymd_and_hms(2021, 2, 15, 13, 0, 0).unwrap();
        let trigger = Trigger::Interval { every: secs(300) };

        let on_time = anchor + TimeDelta::seconds(301);
        assert!(!trigger.is_misfire(anchor, on_time, secs(2)));

        let late = anchor + TimeDelta::seconds(310);
        assert!(trigger.is_misfire(anchor, late, secs(2)));
    }

    #[test]
    fn cron_fire_inside_window_runs() {
        let schedule = parse_cron("0 0,30 * * * *").unwrap();
        let now = Utc.with_ymd_and_hms(2021, 2, 15, 13, 30, 1).unwrap();
        assert!(cron_fired_within(&schedule, now, secs(2)));

        let slightly_early = Utc.with_ymd_and_hms(2021, 2, 15, 13, 29, 59).unwrap();
        assert!(cron_fired_within(&schedule, slightly_early, secs(2)));
    }

    #[test]
    fn cron_fire_outside_window_is_misfire() {
        let trigger = Trigger::Cron {
            expression: "0 0,30 * * * *".to_string(),
            schedule: Box::new(parse_cron("0 0,30 * * * *").unwrap()),
        };
        let anchor = Utc.with_ymd_and_hms(2021, 2, 15, 13, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2021, 2, 15, 13, 30, 10).unwrap();
        assert!(trigger.is_misfire(anchor, late, secs(2)));
    }

    #[test]
    fn weekday_cron_fires_are_on_time_every_weekday() {
        let schedule = parse_cron("0 0 12 * * 1-5").unwrap();
        let mut cursor = Utc.with_ymd_and_hms(2021, 2, 13, 0, 0, 0).unwrap();
        let mut seen = Vec::new();
        for _ in 0..5 {
            let fire = schedule.find_next_occurrence(&cursor, false).unwrap();
            assert!(
                cron_fired_within(&schedule, fire, secs(2)),
                "{fire} counted as misfire"
            );
            seen.push(fire.weekday());
            cursor = fire;
        }
        assert_eq!(
            seen,
            [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
        );
    }

    #[test]
    fn sunday_is_day_zero() {
        let schedule = parse_cron("0 0 12 * * 0").unwrap();
        let start = Utc.with_ymd_and_hms(2021, 2, 15, 0, 0, 0).unwrap();
        let fire = schedule.find_next_occurrence(&start, false).unwrap();
        assert_eq!(fire.weekday(), Weekday::Sun);
        assert_eq!(fire, Utc.with_ymd_and_hms(2021, 2, 21, 12, 0, 0).unwrap());
    }

    #[test]
    fn five_field_cron_is_rejected() {
        assert!(parse_cron("*/5 * * * *").is_err());
    }

    #[test]
    fn trigger_display() {
        assert_eq!(Trigger::Interval { every: secs(300) }.to_string(), "every 300s");
    }
}
