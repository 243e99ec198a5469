//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid UTC offset '{0}'")]
    InvalidUtcOffset(String),

    #[error("Invalid fixed clock instant '{0}'")]
    InvalidFixedNow(String),

    #[error("Sweep interval must be between 1 and 86400 seconds")]
    InvalidSweepInterval,

    #[error("Invalid log filter '{0}'")]
    InvalidLogFilter(String),
}
