//! Application configuration module
//!
//! Configuration is read from environment variables (and a `.env` file when
//! present) using the `config` and `dotenvy` crates. Every setting has a
//! default, so an empty environment yields a runnable configuration.
//!
//! # Example
//!
//! ```no_run
//! use xp_cadence::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Sweeping every {:?}", config.scheduler.sweep_interval());
//! ```

mod cadence;
mod clock;
mod error;
mod logging;
mod scheduler;

pub use cadence::CadenceConfig;
pub use clock::ClockConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use scheduler::SchedulerConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Calendar zone for window boundaries
    #[serde(default)]
    pub cadence: CadenceConfig,

    /// Optional clock override
    #[serde(default)]
    pub clock: ClockConfig,

    /// Periodic sweep settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Environment Variable Format
    ///
    /// - `XP_CADENCE__CADENCE__UTC_OFFSET=-08:00` -> `cadence.utc_offset`
    /// - `XP_CADENCE__SCHEDULER__SWEEP_INTERVAL_SECS=60` -> `scheduler.sweep_interval_secs`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("XP_CADENCE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an unparseable offset, clock instant or
    /// log filter, or an out-of-range sweep interval.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.cadence.validate()?;
        self.clock.validate()?;
        self.scheduler.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
