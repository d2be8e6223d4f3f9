use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Analytics cache and background refresh configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyticsConfig {
    /// Staleness bound for cache reads, in hours. Entries older than this
    /// are recomputed on access.
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,

    /// Enable the periodic full-refresh worker.
    #[serde(default = "default_true")]
    pub refresh_enabled: bool,

    /// Interval between full-refresh passes, in seconds.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Days to keep superseded cache entries before the retention sweep
    /// deletes them.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Interval between retention sweeps, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            max_age_hours: default_max_age_hours(),
            refresh_enabled: true,
            refresh_interval_secs: default_refresh_interval_secs(),
            retention_days: default_retention_days(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl AnalyticsConfig {
    pub fn max_age(&self) -> chrono::Duration {
        chrono::Duration::hours(self.max_age_hours as i64)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_enabled && self.refresh_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "analytics.refresh_interval_secs must be at least 1 when refresh is enabled"
                    .into(),
            ));
        }
        if self.retention_days == 0 {
            return Err(ConfigError::Validation(
                "analytics.retention_days must be at least 1".into(),
            ));
        }
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "analytics.sweep_interval_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_max_age_hours() -> u64 {
    6
}

fn default_refresh_interval_secs() -> u64 {
    3600
}

fn default_retention_days() -> u32 {
    30
}

fn default_sweep_interval_secs() -> u64 {
    6 * 3600
}
