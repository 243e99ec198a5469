//! Streak consistency diagnostics.
//!
//! Anomalies are reported for logging only. Nothing here mutates a cycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::Timestamp;

use super::{CadenceCycle, TimeframeCalculator};

/// A streak/completion inconsistency found on a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreakAnomaly {
    /// A streak is recorded but neither this window nor the one before it
    /// was ever completed.
    StreakWithoutCompletion { streak: u32 },
    /// The window is marked completed yet the streak is zero.
    CompletionWithoutStreak { completed_at: Timestamp },
    /// Whole windows have passed since the last completion while the streak
    /// is still standing.
    StaleStreak { streak: u32, missed_windows: u32 },
}

impl fmt::Display for StreakAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreakAnomaly::StreakWithoutCompletion { streak } => {
                write!(f, "streak {} has no completion on record", streak)
            }
            StreakAnomaly::CompletionWithoutStreak { completed_at } => {
                write!(f, "completed at {} but streak is zero", completed_at.as_datetime())
            }
            StreakAnomaly::StaleStreak {
                streak,
                missed_windows,
            } => write!(
                f,
                "streak {} survived {} missed windows",
                streak, missed_windows
            ),
        }
    }
}

/// Inspects a cycle against the window before it.
pub struct StreakAudit<'a> {
    calendar: &'a TimeframeCalculator,
}

impl<'a> StreakAudit<'a> {
    pub fn new(calendar: &'a TimeframeCalculator) -> Self {
        Self { calendar }
    }

    /// Returns every anomaly found on `cycle` at `now`.
    ///
    /// `previous` is the most recent inactive cycle of the same pathway, if
    /// any; a carried streak is backed by its completion date.
    pub fn inspect(
        &self,
        cycle: &CadenceCycle,
        previous: Option<&CadenceCycle>,
        now: Timestamp,
    ) -> Vec<StreakAnomaly> {
        let mut anomalies = Vec::new();
        let streak = cycle.current_streak();
        let last_completion = cycle
            .last_completed_date()
            .or_else(|| previous.and_then(CadenceCycle::last_completed_date));

        if let Some(completed_at) = cycle.last_completed_date() {
            if streak == 0 {
                anomalies.push(StreakAnomaly::CompletionWithoutStreak { completed_at });
            }
        }

        if streak > 0 {
            match last_completion {
                None => anomalies.push(StreakAnomaly::StreakWithoutCompletion { streak }),
                Some(completed_at) => {
                    let missed_windows =
                        self.calendar
                            .missed_window_count(completed_at, now, cycle.frequency());
                    if missed_windows > 0 {
                        anomalies.push(StreakAnomaly::StaleStreak {
                            streak,
                            missed_windows,
                        });
                    }
                }
            }
        }

        anomalies
    }
}
