//! Cycle scheduling configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// When ingest cycles run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between cycles (default: 300)
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// A fire that starts later than this is skipped (default: 2)
    #[serde(default = "default_misfire_grace")]
    pub misfire_grace_secs: u64,

    /// Six-field cron expression used instead of the interval
    #[serde(default)]
    pub cron: Option<String>,

    /// Run one cycle immediately when the scheduler starts (default: true)
    #[serde(default = "default_run_on_start")]
    pub run_on_start: bool,
}

const fn default_interval() -> u64 {
    300
}

const fn default_misfire_grace() -> u64 {
    2
}

const fn default_run_on_start() -> bool {
    true
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            misfire_grace_secs: default_misfire_grace(),
            cron: None,
            run_on_start: default_run_on_start(),
        }
    }
}

impl ScheduleConfig {
    /// Interval between cycles
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Misfire grace period
    pub const fn misfire_grace(&self) -> Duration {
        Duration::from_secs(self.misfire_grace_secs)
    }
}
