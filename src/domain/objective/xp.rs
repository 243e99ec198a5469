//! XpValue value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Experience points awarded for completing one objective.
///
/// Always a multiple of 10 between 100 and 500 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct XpValue(u32);

impl XpValue {
    pub const MIN: u32 = 100;
    pub const MAX: u32 = 500;
    pub const STEP: u32 = 10;

    pub fn new(value: u32) -> Result<Self, ValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValidationError::out_of_range(
                "xp_value",
                i64::from(Self::MIN),
                i64::from(Self::MAX),
                i64::from(value),
            ));
        }
        if value % Self::STEP != 0 {
            return Err(ValidationError::invalid_format(
                "xp_value",
                format!("{} is not a multiple of {}", value, Self::STEP),
            ));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for XpValue {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<XpValue> for u32 {
    fn from(xp: XpValue) -> Self {
        xp.0
    }
}

impl fmt::Display for XpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} XP", self.0)
    }
}
