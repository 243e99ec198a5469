//! In-place edits of an active cadence window.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode, ObjectiveId, Timestamp};
use crate::domain::objective::Objective;

use super::{AllocationContext, CadenceCycle, CadenceSettings, CyclePhase, WindowFill};

/// How an immediate reconfiguration moved the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakChange {
    /// The lowered target is already met; the window is credited now.
    Advanced,
    /// The raised target is no longer met; the earlier credit is taken back.
    Revoked,
    Unchanged,
}

/// Outcome of `CadenceCycle::apply_immediately`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconfiguration {
    pub streak_change: StreakChange,
    pub fill: WindowFill,
}

impl CadenceCycle {
    /// Applies new settings to the running window right away.
    ///
    /// Completion is re-evaluated against the new target, the window timing
    /// restarts from `ctx.now`, and assigned objectives are reconciled.
    /// Completed objectives always stay assigned.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the cycle is inactive or expired
    pub fn apply_immediately(
        &mut self,
        objectives: &mut Vec<Objective>,
        settings: CadenceSettings,
        ctx: AllocationContext<'_>,
    ) -> Result<Reconfiguration, DomainError> {
        let now = ctx.now;
        self.ensure_editable(now)?;

        let previous_streak = self.current_streak;
        let completed_count = self.completed_objectives_count(objectives);
        let was_complete = self.is_complete(objectives);

        self.frequency = settings.frequency();
        self.required_count = settings.required_count();
        let now_complete = completed_count >= self.required_count;

        let streak_change = match (was_complete, now_complete) {
            (false, true) => {
                self.last_completed_date = Some(now);
                self.current_streak = previous_streak + 1;
                StreakChange::Advanced
            }
            (true, false) => {
                self.last_completed_date = None;
                self.current_streak = previous_streak.saturating_sub(1);
                StreakChange::Revoked
            }
            _ => StreakChange::Unchanged,
        };

        self.end_date = ctx.calendar.window_end(now, self.frequency);

        let mut fill = WindowFill::default();
        if now_complete {
            self.release_incomplete(objectives, usize::MAX, &mut fill);
        } else {
            let assigned = self.assigned_count(objectives);
            if assigned > self.required_count {
                let surplus = (assigned - self.required_count) as usize;
                self.release_incomplete(objectives, surplus, &mut fill);
            } else {
                self.fill_up(objectives, self.required_count - assigned, ctx, &mut fill)?;
            }
        }

        Ok(Reconfiguration {
            streak_change,
            fill,
        })
    }

    /// Changes only the target count; it takes effect at the next window.
    ///
    /// # Errors
    ///
    /// - `DeferredFrequencyChange` if `settings` names a different frequency
    /// - `InvalidStateTransition` if the cycle is inactive or expired
    pub fn apply_deferred(
        &mut self,
        settings: CadenceSettings,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        self.ensure_editable(now)?;
        if settings.frequency() != self.frequency {
            return Err(DomainError::new(
                ErrorCode::DeferredFrequencyChange,
                format!(
                    "Frequency cannot change from {} to {} without applying immediately",
                    self.frequency,
                    settings.frequency()
                ),
            )
            .with_detail("cycle_id", self.id.to_string()));
        }
        self.required_count = settings.required_count();
        Ok(())
    }

    /// Turns the cadence off, closing the window at `now`.
    ///
    /// Streak and completion history stay on the record.
    pub fn disable(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition(now, CyclePhase::Inactive)?;
        self.is_active = false;
        self.end_date = Some(now);
        Ok(())
    }

    /// Returns the incomplete objectives of this cycle to the pool.
    ///
    /// Completed objectives stay attached as history.
    pub fn release_unfinished(&self, objectives: &mut [Objective]) -> Vec<ObjectiveId> {
        let mut fill = WindowFill::default();
        self.release_incomplete(objectives, usize::MAX, &mut fill);
        fill.released
    }

    /// Edits apply only to a window that is still running. An expired
    /// window must be rolled over first so a miss resets the streak.
    fn ensure_editable(&self, now: Timestamp) -> Result<(), DomainError> {
        let reason = match self.phase(now) {
            CyclePhase::Inactive => "is no longer active",
            CyclePhase::Expired => "has expired and must be rolled over first",
            CyclePhase::Open | CyclePhase::Fulfilled => return Ok(()),
        };
        Err(DomainError::new(
            ErrorCode::InvalidStateTransition,
            format!("Cycle {} {}", self.id, reason),
        )
        .with_detail("cycle_id", self.id.to_string()))
    }

    /// Unassigns up to `limit` incomplete objectives, latest order first.
    fn release_incomplete(&self, objectives: &mut [Objective], limit: usize, fill: &mut WindowFill) {
        let mut incomplete: Vec<usize> = objectives
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_assigned_to(self.id) && !o.is_completed())
            .map(|(index, _)| index)
            .collect();
        incomplete.sort_by_key(|&index| std::cmp::Reverse(objectives[index].order()));

        for index in incomplete.into_iter().take(limit) {
            objectives[index].detach();
            fill.released.push(objectives[index].id());
        }
    }
}
