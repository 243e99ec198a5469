//! CadenceCycle entity - one windowed goal period of a pathway.
//!
//! A cycle never holds its objectives. Every query and mutation that needs
//! them takes the pathway's working set of objectives and filters by the
//! cycle id stored on each objective.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CycleId, DomainError, ErrorCode, Frequency, ObjectiveId, PathwayId, StateMachine, Timestamp,
};
use crate::domain::objective::{GenerationRequest, Objective, ObjectiveGenerator};

use super::{CadenceSettings, CyclePhase, TimeframeCalculator};

/// Collaborators and inputs needed to fill a window with objectives.
#[derive(Clone, Copy)]
pub struct AllocationContext<'a> {
    pub generator: &'a dyn ObjectiveGenerator,
    pub calendar: &'a TimeframeCalculator,
    /// Order to give the first freshly generated objective.
    pub next_order: i32,
    pub now: Timestamp,
}

/// What happened to the objective pool while filling a window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowFill {
    /// Existing objectives picked up from the pool.
    pub assigned: Vec<ObjectiveId>,
    /// Objectives created by the generator and assigned to the window.
    pub generated: Vec<ObjectiveId>,
    /// Objectives whose cycle reference was cleared.
    pub released: Vec<ObjectiveId>,
    /// Slots left empty after pool selection and generation.
    pub shortfall: u32,
    /// Generator failure, if generation was attempted and failed.
    pub generation_error: Option<DomainError>,
}

impl WindowFill {
    pub fn is_short(&self) -> bool {
        self.shortfall > 0
    }
}

/// One cadence window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceCycle {
    pub(super) id: CycleId,
    pub(super) pathway_id: PathwayId,
    pub(super) frequency: Frequency,
    pub(super) required_count: u32,
    pub(super) start_date: Timestamp,
    pub(super) end_date: Option<Timestamp>,
    pub(super) is_active: bool,
    pub(super) current_streak: u32,
    pub(super) last_completed_date: Option<Timestamp>,
}

impl CadenceCycle {
    /// Opens the first window of a cadence and fills it from the pool.
    ///
    /// `objectives` is the pathway's working set; generated objectives are
    /// appended to it.
    pub fn start(
        pathway_id: PathwayId,
        settings: CadenceSettings,
        objectives: &mut Vec<Objective>,
        ctx: AllocationContext<'_>,
    ) -> Result<(Self, WindowFill), DomainError> {
        let cycle = Self {
            id: CycleId::new(),
            pathway_id,
            frequency: settings.frequency(),
            required_count: settings.required_count(),
            start_date: ctx.now,
            end_date: ctx.calendar.window_end(ctx.now, settings.frequency()),
            is_active: true,
            current_streak: 0,
            last_completed_date: None,
        };

        let mut fill = WindowFill::default();
        cycle.fill_up(objectives, cycle.required_count, ctx, &mut fill)?;
        Ok((cycle, fill))
    }

    /// Reconstitutes a cycle from persisted data.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: CycleId,
        pathway_id: PathwayId,
        frequency: Frequency,
        required_count: u32,
        start_date: Timestamp,
        end_date: Option<Timestamp>,
        is_active: bool,
        current_streak: u32,
        last_completed_date: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            pathway_id,
            frequency,
            required_count,
            start_date,
            end_date,
            is_active,
            current_streak,
            last_completed_date,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> CycleId {
        self.id
    }

    pub fn pathway_id(&self) -> PathwayId {
        self.pathway_id
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn required_count(&self) -> u32 {
        self.required_count
    }

    pub fn start_date(&self) -> Timestamp {
        self.start_date
    }

    pub fn end_date(&self) -> Option<Timestamp> {
        self.end_date
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    /// When the window's target was first reached, if it has been.
    pub fn last_completed_date(&self) -> Option<Timestamp> {
        self.last_completed_date
    }

    // ───────────────────────────────────────────────────────────────
    // Queries
    // ───────────────────────────────────────────────────────────────

    /// True once `now` has reached the end date. Cycles without an end date
    /// never expire.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.end_date.map_or(false, |end| !now.is_before(&end))
    }

    /// Objectives from the working set assigned to this cycle.
    pub fn assigned<'o>(&self, objectives: &'o [Objective]) -> impl Iterator<Item = &'o Objective> {
        let id = self.id;
        objectives.iter().filter(move |o| o.is_assigned_to(id))
    }

    pub fn assigned_count(&self, objectives: &[Objective]) -> u32 {
        count_u32(self.assigned(objectives))
    }

    pub fn completed_objectives_count(&self, objectives: &[Objective]) -> u32 {
        count_u32(self.assigned(objectives).filter(|o| o.is_completed()))
    }

    pub fn is_complete(&self, objectives: &[Objective]) -> bool {
        self.completed_objectives_count(objectives) >= self.required_count
    }

    /// Fraction of the target reached, in `[0, 1]`.
    pub fn progress(&self, objectives: &[Objective]) -> f64 {
        if self.required_count == 0 {
            return 0.0;
        }
        let ratio =
            f64::from(self.completed_objectives_count(objectives)) / f64::from(self.required_count);
        ratio.min(1.0)
    }

    /// Time left before the window closes; negative once expired.
    pub fn time_until_expiry(&self, now: Timestamp) -> Option<Duration> {
        self.end_date.map(|end| end.duration_since(&now))
    }

    /// Whole windows missed since this window closed.
    pub fn missed_windows(&self, now: Timestamp, calendar: &TimeframeCalculator) -> u32 {
        self.end_date
            .map_or(0, |end| calendar.missed_window_count(end, now, self.frequency))
    }

    /// Lifecycle phase at `now`.
    pub fn phase(&self, now: Timestamp) -> CyclePhase {
        if !self.is_active {
            CyclePhase::Inactive
        } else if self.is_expired(now) {
            CyclePhase::Expired
        } else if self.last_completed_date.is_some() {
            CyclePhase::Fulfilled
        } else {
            CyclePhase::Open
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Behavior
    // ───────────────────────────────────────────────────────────────

    /// Credits the window the first time its target is reached.
    ///
    /// Returns true when the streak advanced. Repeat calls in the same
    /// window and calls after expiry are no-ops.
    pub fn check_completion(&mut self, objectives: &[Objective], now: Timestamp) -> bool {
        let phase = self.phase(now);
        if !phase.can_transition_to(&CyclePhase::Fulfilled) || !self.is_complete(objectives) {
            return false;
        }
        self.current_streak += 1;
        self.last_completed_date = Some(now);
        true
    }

    /// Moves this cycle into its next window in place.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the window has not expired
    pub fn advance_to_next_window(
        &mut self,
        objectives: &mut Vec<Objective>,
        ctx: AllocationContext<'_>,
    ) -> Result<WindowFill, DomainError> {
        self.ensure_expired(ctx.now)?;
        let owner = self.id;
        self.advance_from(owner, objectives, ctx)
    }

    /// Ends this expired cycle and opens a successor with the same settings.
    ///
    /// The successor inherits the streak when this window was complete.
    /// This cycle becomes inactive and keeps its record for history.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the window has not expired
    pub fn roll_over(
        &mut self,
        objectives: &mut Vec<Objective>,
        ctx: AllocationContext<'_>,
    ) -> Result<(CadenceCycle, WindowFill), DomainError> {
        self.ensure_expired(ctx.now)?;

        let mut successor = Self {
            id: CycleId::new(),
            ..self.clone()
        };
        let fill = successor.advance_from(self.id, objectives, ctx)?;
        self.end(ctx.now)?;
        Ok((successor, fill))
    }

    /// Deactivates the cycle, finalising the end date only when unset.
    pub fn end(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition(now, CyclePhase::Inactive)?;
        self.is_active = false;
        if self.end_date.is_none() {
            self.end_date = Some(now);
        }
        Ok(())
    }

    fn ensure_expired(&self, now: Timestamp) -> Result<(), DomainError> {
        match self.phase(now) {
            CyclePhase::Expired => Ok(()),
            phase => Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cycle {} cannot advance while {}", self.id, phase),
            )
            .with_detail("cycle_id", self.id.to_string())),
        }
    }

    pub(super) fn transition(
        &self,
        now: Timestamp,
        target: CyclePhase,
    ) -> Result<CyclePhase, DomainError> {
        self.phase(now).transition_to(target).map_err(|e| {
            DomainError::new(ErrorCode::InvalidStateTransition, e.to_string())
                .with_detail("cycle_id", self.id.to_string())
        })
    }

    /// Window transition shared by in-place advance and roll-over.
    ///
    /// `owner` is the cycle whose objectives are detached; the window is
    /// refilled under `self.id`.
    fn advance_from(
        &mut self,
        owner: CycleId,
        objectives: &mut Vec<Objective>,
        ctx: AllocationContext<'_>,
    ) -> Result<WindowFill, DomainError> {
        let was_complete = count_u32(
            objectives
                .iter()
                .filter(|o| o.is_assigned_to(owner) && o.is_completed()),
        ) >= self.required_count;
        let previous_streak = self.current_streak;

        let mut fill = WindowFill::default();
        for objective in objectives.iter_mut().filter(|o| o.is_assigned_to(owner)) {
            objective.detach();
            fill.released.push(objective.id());
        }

        self.fill_up(objectives, self.required_count, ctx, &mut fill)?;

        self.start_date = ctx.now;
        self.end_date = ctx.calendar.window_end(ctx.now, self.frequency);
        self.is_active = true;
        self.current_streak = if was_complete { previous_streak } else { 0 };
        self.last_completed_date = None;

        Ok(fill)
    }

    /// Assigns up to `wanted` more objectives: pool first, ordered by
    /// `order`, then freshly generated ones for any remainder.
    pub(super) fn fill_up(
        &self,
        objectives: &mut Vec<Objective>,
        wanted: u32,
        ctx: AllocationContext<'_>,
        fill: &mut WindowFill,
    ) -> Result<(), DomainError> {
        if wanted == 0 {
            return Ok(());
        }

        let mut candidates: Vec<usize> = objectives
            .iter()
            .enumerate()
            .filter(|(_, o)| o.pathway_id() == self.pathway_id && o.is_available())
            .map(|(index, _)| index)
            .collect();
        candidates.sort_by_key(|&index| (objectives[index].order(), objectives[index].id()));
        candidates.truncate(wanted as usize);
        let picked = count_u32(candidates.iter());

        for index in candidates {
            objectives[index].assign_to(self.id)?;
            fill.assigned.push(objectives[index].id());
        }

        let missing = wanted.saturating_sub(picked);
        if missing == 0 {
            return Ok(());
        }

        let next_order = objectives
            .iter()
            .filter(|o| o.pathway_id() == self.pathway_id)
            .map(|o| o.order() + 1)
            .max()
            .map_or(ctx.next_order, |order| order.max(ctx.next_order));
        let request = GenerationRequest {
            pathway_id: self.pathway_id,
            count: missing,
            first_order: next_order,
            assign_to: Some(self.id),
            created_at: ctx.now,
        };

        match ctx.generator.generate(&request) {
            Ok(generated) => {
                let generated_count = count_u32(generated.iter());
                fill.generated.extend(generated.iter().map(Objective::id));
                objectives.extend(generated);
                fill.shortfall = missing.saturating_sub(generated_count);
            }
            Err(err) => {
                fill.shortfall = missing;
                fill.generation_error = Some(err);
            }
        }
        Ok(())
    }
}

fn count_u32<I: Iterator>(iter: I) -> u32 {
    u32::try_from(iter.count()).unwrap_or(u32::MAX)
}
