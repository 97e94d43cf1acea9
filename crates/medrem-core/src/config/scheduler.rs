//! Reminder sweep and maintenance scheduling configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the hourly dose-reminder sweep and the course-retirement job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Whether the background scheduler runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum number of medications dispatched concurrently in one sweep.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Upper bound for notifying one due medication's devices, in seconds.
    #[serde(default = "default_dispatch_timeout")]
    pub dispatch_timeout_seconds: u64,
    /// Upper bound for a whole sweep, in seconds.
    #[serde(default = "default_sweep_timeout")]
    pub sweep_timeout_seconds: u64,
    /// Look-ahead of the "next medications" query, in minutes.
    #[serde(default = "default_due_window")]
    pub due_window_minutes: i64,
    /// Cron expression (with seconds) for the course-retirement job.
    #[serde(default = "default_retirement_cron")]
    pub retirement_cron: String,
}

impl SchedulerConfig {
    /// Per-medication notify timeout.
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_seconds)
    }

    /// Whole-sweep timeout.
    pub fn sweep_timeout(&self) -> Duration {
        Duration::from_secs(self.sweep_timeout_seconds)
    }

    /// Due window as a chrono duration.
    pub fn due_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.due_window_minutes)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            concurrency: default_concurrency(),
            dispatch_timeout_seconds: default_dispatch_timeout(),
            sweep_timeout_seconds: default_sweep_timeout(),
            due_window_minutes: default_due_window(),
            retirement_cron: default_retirement_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    8
}

fn default_dispatch_timeout() -> u64 {
    30
}

fn default_sweep_timeout() -> u64 {
    600
}

fn default_due_window() -> i64 {
    60
}

fn default_retirement_cron() -> String {
    "0 5 0 * * *".to_string()
}
