//! CyclePhase enum describing where a cadence window is in its lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle phase of a cadence cycle, derived from its stored fields.
///
/// Valid transitions:
/// - Open -> Fulfilled (target reached before expiry)
/// - Open -> Expired (window missed)
/// - Fulfilled -> Expired
/// - Fulfilled -> Open (target raised by an immediate reconfiguration)
/// - Open | Fulfilled | Expired -> Inactive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    #[default]
    Open,
    Fulfilled,
    Expired,
    Inactive,
}

impl CyclePhase {
    /// Returns true while the window still accepts completions for credit.
    pub fn accepts_credit(&self) -> bool {
        matches!(self, CyclePhase::Open | CyclePhase::Fulfilled)
    }
}

impl StateMachine for CyclePhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use CyclePhase::*;
        matches!(
            (self, target),
            (Open, Fulfilled)
                | (Open, Expired)
                | (Open, Inactive)
                | (Fulfilled, Open)
                | (Fulfilled, Expired)
                | (Fulfilled, Inactive)
                | (Expired, Inactive)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use CyclePhase::*;
        match self {
            Open => vec![Fulfilled, Expired, Inactive],
            Fulfilled => vec![Open, Expired, Inactive],
            Expired => vec![Inactive],
            Inactive => vec![],
        }
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CyclePhase::Open => "Open",
            CyclePhase::Fulfilled => "Fulfilled",
            CyclePhase::Expired => "Expired",
            CyclePhase::Inactive => "Inactive",
        };
        write!(f, "{}", s)
    }
}
