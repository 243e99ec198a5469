//! Validated cadence parameters.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Frequency, ValidationError};

/// Upper bound on objectives per window.
pub const MAX_REQUIRED_COUNT: u32 = 50;

/// A frequency and target count pair accepted at the application boundary.
///
/// A live cadence must ask for at least one objective per window. With
/// `Frequency::None` the count is kept as given so a later re-enable can
/// reuse it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceSettings {
    frequency: Frequency,
    required_count: u32,
}

impl CadenceSettings {
    pub fn new(frequency: Frequency, required_count: u32) -> Result<Self, ValidationError> {
        if !frequency.is_none() && (required_count == 0 || required_count > MAX_REQUIRED_COUNT) {
            return Err(ValidationError::out_of_range(
                "required_count",
                1,
                i64::from(MAX_REQUIRED_COUNT),
                i64::from(required_count),
            ));
        }
        Ok(Self {
            frequency,
            required_count,
        })
    }

    /// Settings describing a disabled cadence.
    pub fn disabled() -> Self {
        Self {
            frequency: Frequency::None,
            required_count: 0,
        }
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn required_count(&self) -> u32 {
        self.required_count
    }

    pub fn is_disabled(&self) -> bool {
        self.frequency.is_none()
    }
}
