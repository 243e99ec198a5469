//! Periodic sweep configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const MAX_SWEEP_INTERVAL_SECS: u64 = 86_400;

/// Scheduler configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Run the periodic sweep after the startup sweep
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seconds between sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl SchedulerConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sweep_interval_secs == 0 || self.sweep_interval_secs > MAX_SWEEP_INTERVAL_SECS {
            return Err(ValidationError::InvalidSweepInterval);
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_sweep_interval() -> u64 {
    300
}
