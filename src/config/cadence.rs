//! Calendar configuration for cadence windows

use serde::Deserialize;

use crate::domain::cadence::{CalendarZone, TimeframeCalculator};

use super::error::ValidationError;

/// Cadence configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CadenceConfig {
    /// Fixed UTC offset for window boundaries, e.g. `-08:00`.
    /// Unset means the device's local timezone.
    pub utc_offset: Option<String>,
}

impl CadenceConfig {
    /// Builds the boundary calculator for the configured zone.
    pub fn calendar(&self) -> Result<TimeframeCalculator, ValidationError> {
        match &self.utc_offset {
            None => Ok(TimeframeCalculator::local()),
            Some(offset) => CalendarZone::parse_offset(offset)
                .map(TimeframeCalculator::new)
                .map_err(|_| ValidationError::InvalidUtcOffset(offset.clone())),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.calendar().map(|_| ())
    }
}
