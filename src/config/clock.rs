//! Clock override configuration

use serde::Deserialize;

use crate::domain::foundation::Timestamp;

use super::error::ValidationError;

/// Clock configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClockConfig {
    /// RFC 3339 instant to pin the clock to. Unset uses the system clock.
    pub fixed_now: Option<String>,
}

impl ClockConfig {
    /// The pinned instant, if one is configured.
    pub fn fixed_instant(&self) -> Result<Option<Timestamp>, ValidationError> {
        self.fixed_now
            .as_deref()
            .map(|value| {
                Timestamp::parse_rfc3339(value)
                    .map_err(|_| ValidationError::InvalidFixedNow(value.to_string()))
            })
            .transpose()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.fixed_instant().map(|_| ())
    }
}
