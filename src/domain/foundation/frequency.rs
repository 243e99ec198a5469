//! Frequency enum for cadence window length.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// How often a cadence window repeats.
///
/// Window alignment is always to the local calendar: daily windows run
/// midnight to midnight, weekly windows Monday to Monday, monthly windows
/// from the 1st to the 1st. `None` means no cadence is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// All frequencies in raw-value order.
    pub const ALL: [Frequency; 4] = [
        Frequency::None,
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
    ];

    /// Returns true when no cadence is active.
    pub fn is_none(&self) -> bool {
        matches!(self, Frequency::None)
    }

    /// Stable integer encoding used by stores.
    pub fn raw_value(&self) -> i32 {
        match self {
            Frequency::None => 0,
            Frequency::Daily => 1,
            Frequency::Weekly => 2,
            Frequency::Monthly => 3,
        }
    }

    /// Decodes a stored integer.
    pub fn from_raw(raw: i32) -> Result<Self, ValidationError> {
        match raw {
            0 => Ok(Frequency::None),
            1 => Ok(Frequency::Daily),
            2 => Ok(Frequency::Weekly),
            3 => Ok(Frequency::Monthly),
            other => Err(ValidationError::out_of_range("frequency", 0, 3, other as i64)),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Frequency::None => "None",
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        };
        write!(f, "{}", s)
    }
}
