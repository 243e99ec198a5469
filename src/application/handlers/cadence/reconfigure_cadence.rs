//! ReconfigureCadenceHandler - Edits the cadence of a pathway.
//!
//! | Request | Active cycle | Outcome |
//! |---------|--------------|---------|
//! | immediate, frequency set | yes | window edited in place |
//! | immediate, frequency set | no | new cycle started |
//! | immediate, `None` | yes | cadence disabled |
//! | deferred | yes | target count changes, frequency must match |
//! | deferred or `None` | no | `NoActiveCycle` |
//!
//! An active cycle whose window has already ended is rolled over first, the
//! way a sweep would, and the edit lands on its successor.

use std::sync::Arc;

use tracing::info;

use crate::domain::cadence::{
    AllocationContext, CadenceCycle, CadenceSettings, CycleCompleted, CyclesDidReset,
    Reconfiguration, StreakChange, TimeframeCalculator, WindowFill,
};
use crate::domain::foundation::{
    CommandMetadata, DomainError, ErrorCode, EventEnvelope, EventId, Frequency, PathwayId,
    Timestamp,
};
use crate::domain::objective::ObjectiveGenerator;
use crate::domain::pathway::{Pathway, PathwayDidUpdate, PathwayUpdateReason};
use crate::ports::{
    ChangeSet, Clock, CycleRepository, EventPublisher, ObjectiveRepository, PathwayRepository,
    UnitOfWork,
};

use super::super::support::{
    envelope, load_working_set, next_order, publish_quietly, report_fill,
};

/// Command to change a pathway's cadence.
#[derive(Debug, Clone)]
pub struct ReconfigureCadenceCommand {
    pub pathway_id: PathwayId,
    pub frequency: Frequency,
    pub required_count: u32,
    /// Edit the running window now instead of only changing the count.
    pub apply_immediately: bool,
}

/// What the reconfiguration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconfigureOutcome {
    /// No cadence was running; a first window was opened.
    Started(WindowFill),
    /// The running window was edited in place.
    Applied(Reconfiguration),
    /// Only the target count changed.
    Deferred,
    /// The cadence was turned off.
    Disabled,
}

/// Result of reconfiguring a cadence.
#[derive(Debug, Clone)]
pub struct ReconfigureCadenceResult {
    pub outcome: ReconfigureOutcome,
    /// The cycle after the change (inactive when disabled).
    pub cycle: CadenceCycle,
    /// The expired cycle closed out before the edit, if there was one.
    pub rolled_over: Option<CadenceCycle>,
}

/// Handler for cadence edits.
pub struct ReconfigureCadenceHandler {
    pathway_repository: Arc<dyn PathwayRepository>,
    cycle_repository: Arc<dyn CycleRepository>,
    objective_repository: Arc<dyn ObjectiveRepository>,
    unit_of_work: Arc<dyn UnitOfWork>,
    generator: Arc<dyn ObjectiveGenerator>,
    calendar: TimeframeCalculator,
    clock: Arc<dyn Clock>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ReconfigureCadenceHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pathway_repository: Arc<dyn PathwayRepository>,
        cycle_repository: Arc<dyn CycleRepository>,
        objective_repository: Arc<dyn ObjectiveRepository>,
        unit_of_work: Arc<dyn UnitOfWork>,
        generator: Arc<dyn ObjectiveGenerator>,
        calendar: TimeframeCalculator,
        clock: Arc<dyn Clock>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            pathway_repository,
            cycle_repository,
            objective_repository,
            unit_of_work,
            generator,
            calendar,
            clock,
            event_publisher,
        }
    }

    /// # Errors
    ///
    /// - `ValidationFailed` for an out-of-range count
    /// - `PathwayNotFound` / `CycleNotFound` for missing records
    /// - `NoActiveCycle` for a deferred edit or disable without a cadence
    /// - `DeferredFrequencyChange` for a deferred frequency change
    /// - `DatabaseError` if the commit fails
    pub async fn handle(
        &self,
        cmd: ReconfigureCadenceCommand,
        metadata: CommandMetadata,
    ) -> Result<ReconfigureCadenceResult, DomainError> {
        let settings = CadenceSettings::new(cmd.frequency, cmd.required_count)?;
        let now = self.clock.now();

        let mut pathway = self
            .pathway_repository
            .find_by_id(&cmd.pathway_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::PathwayNotFound,
                    format!("Pathway {} not found", cmd.pathway_id),
                )
            })?;

        let active = match pathway.active_cycle_id() {
            Some(cycle_id) => Some(self.cycle_repository.find_by_id(&cycle_id).await?.ok_or_else(
                || {
                    DomainError::new(
                        ErrorCode::CycleNotFound,
                        format!("Active cycle {} not found", cycle_id),
                    )
                },
            )?),
            None => None,
        };

        let pool_limit = settings
            .required_count()
            .max(active.as_ref().map_or(0, CadenceCycle::required_count));
        let mut objectives = load_working_set(
            self.objective_repository.as_ref(),
            pathway.id(),
            pathway.active_cycle_id(),
            pool_limit,
        )
        .await?;
        let ctx = AllocationContext {
            generator: self.generator.as_ref(),
            calendar: &self.calendar,
            next_order: next_order(self.objective_repository.as_ref(), pathway.id()).await?,
            now,
        };

        let disabling = cmd.apply_immediately && settings.is_disabled();
        let mut rolled_over = None;
        let active = match active {
            Some(mut expired) if expired.is_expired(now) && !disabling => {
                let missed_windows = expired.missed_windows(now, &self.calendar);
                let (successor, fill) = expired.roll_over(&mut objectives, ctx)?;
                pathway.activate_cycle(successor.id());
                report_fill(pathway.id(), &fill);
                info!(
                    pathway_id = %pathway.id(),
                    ended_cycle_id = %expired.id(),
                    new_cycle_id = %successor.id(),
                    streak = successor.current_streak(),
                    missed_windows,
                    "Expired window rolled over before reconfiguring"
                );
                rolled_over = Some(expired);
                Some(successor)
            }
            other => other,
        };

        let (outcome, cycle) = match (active, cmd.apply_immediately) {
            (None, true) if !settings.is_disabled() => {
                let (cycle, fill) =
                    CadenceCycle::start(pathway.id(), settings, &mut objectives, ctx)?;
                pathway.activate_cycle(cycle.id());
                (ReconfigureOutcome::Started(fill), cycle)
            }
            (None, _) => {
                return Err(DomainError::new(
                    ErrorCode::NoActiveCycle,
                    format!("Pathway {} has no active cadence", pathway.id()),
                ));
            }
            (Some(mut cycle), true) if settings.is_disabled() => {
                cycle.disable(now)?;
                cycle.release_unfinished(&mut objectives);
                pathway.clear_active_cycle();
                (ReconfigureOutcome::Disabled, cycle)
            }
            (Some(mut cycle), true) => {
                let change = cycle.apply_immediately(&mut objectives, settings, ctx)?;
                (ReconfigureOutcome::Applied(change), cycle)
            }
            (Some(mut cycle), false) => {
                cycle.apply_deferred(settings, now)?;
                (ReconfigureOutcome::Deferred, cycle)
            }
        };

        match &outcome {
            ReconfigureOutcome::Started(fill) => report_fill(pathway.id(), fill),
            ReconfigureOutcome::Applied(change) => report_fill(pathway.id(), &change.fill),
            _ => {}
        }

        let mut changes = ChangeSet::for_pathway(pathway.id()).with_pathway(pathway.clone());
        if let Some(ended) = &rolled_over {
            changes = changes.with_cycle(ended.clone());
        }
        self.unit_of_work
            .commit(changes.with_cycle(cycle.clone()).with_objectives(objectives))
            .await?;

        info!(
            pathway_id = %pathway.id(),
            cycle_id = %cycle.id(),
            frequency = %cycle.frequency(),
            required_count = cycle.required_count(),
            outcome = outcome_name(&outcome),
            "Cadence reconfigured"
        );

        let mut envelopes = Vec::new();
        if rolled_over.is_some() {
            let reset = CyclesDidReset {
                event_id: EventId::new(),
                pathway_ids: vec![pathway.id()],
                reset_at: now,
            };
            envelopes.extend(envelope(&reset, &metadata));
        }
        envelopes.extend(self.events(&pathway, &cycle, &outcome, now, &metadata));
        publish_quietly(self.event_publisher.as_ref(), envelopes).await;

        Ok(ReconfigureCadenceResult {
            outcome,
            cycle,
            rolled_over,
        })
    }

    fn events(
        &self,
        pathway: &Pathway,
        cycle: &CadenceCycle,
        outcome: &ReconfigureOutcome,
        now: Timestamp,
        metadata: &CommandMetadata,
    ) -> Vec<EventEnvelope> {
        let reason = match outcome {
            ReconfigureOutcome::Started(_) => PathwayUpdateReason::CadenceEnabled,
            ReconfigureOutcome::Disabled => PathwayUpdateReason::CadenceDisabled,
            _ => PathwayUpdateReason::CadenceReconfigured,
        };
        let mut envelopes = Vec::new();

        if let ReconfigureOutcome::Applied(change) = outcome {
            if change.streak_change == StreakChange::Advanced {
                let completed = CycleCompleted {
                    event_id: EventId::new(),
                    cycle_id: cycle.id(),
                    pathway_id: pathway.id(),
                    streak: cycle.current_streak(),
                    completed_at: now,
                };
                envelopes.extend(envelope(&completed, metadata));
            }
        }

        let updated = PathwayDidUpdate::new(pathway.id(), reason, now);
        envelopes.extend(envelope(&updated, metadata));
        envelopes
    }
}

fn outcome_name(outcome: &ReconfigureOutcome) -> &'static str {
    match outcome {
        ReconfigureOutcome::Started(_) => "started",
        ReconfigureOutcome::Applied(_) => "applied",
        ReconfigureOutcome::Deferred => "deferred",
        ReconfigureOutcome::Disabled => "disabled",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::cadence::SweepCyclesCommand;
    use crate::application::handlers::test_support::*;
    use crate::domain::objective::Objective;

    fn completed_in(cycle: &CadenceCycle, objectives: &[Objective]) -> usize {
        cycle.assigned(objectives).filter(|o| o.is_completed()).count()
    }

    fn command(
        pathway_id: PathwayId,
        frequency: Frequency,
        count: u32,
        apply_immediately: bool,
    ) -> ReconfigureCadenceCommand {
        ReconfigureCadenceCommand {
            pathway_id,
            frequency,
            required_count: count,
            apply_immediately,
        }
    }

    #[tokio::test]
    async fn lowering_count_credits_window_and_keeps_completed_work() {
        let h = Harness::at("2024-01-15T08:00:00-08:00");
        let (pathway, cycle) = h.seed_cadence(Frequency::Daily, 3, 5).await;
        h.complete_assigned(&pathway, &cycle, 2).await;
        h.clock.set(ts("2024-01-15T12:00:00-08:00"));

        let result = h
            .state()
            .reconfigure_cadence_handler()
            .handle(
                command(pathway.id(), Frequency::Daily, 2, true),
                CommandMetadata::user(),
            )
            .await
            .unwrap();

        let ReconfigureOutcome::Applied(change) = &result.outcome else {
            panic!("expected in-place edit, got {:?}", result.outcome);
        };
        assert_eq!(change.streak_change, StreakChange::Advanced);
        assert_eq!(change.fill.released.len(), 1);
        assert_eq!(result.cycle.current_streak(), 1);

        let objectives = h.objectives_of(pathway.id()).await;
        assert_eq!(completed_in(&result.cycle, &objectives), 2);
        assert_eq!(result.cycle.assigned_count(&objectives), 2);
        assert!(h.bus.has_event("cadence.cycle_completed.v1"));
        assert!(h.bus.has_event("pathway.updated.v1"));
    }

    #[tokio::test]
    async fn raising_count_revokes_credit_and_tops_up() {
        let h = Harness::at("2024-01-15T08:00:00-08:00");
        let (pathway, cycle) = h.seed_cadence(Frequency::Daily, 1, 5).await;
        h.complete_assigned(&pathway, &cycle, 1).await;
        assert_eq!(h.cycle(cycle.id()).await.current_streak(), 1);

        let result = h
            .state()
            .reconfigure_cadence_handler()
            .handle(
                command(pathway.id(), Frequency::Daily, 3, true),
                CommandMetadata::user(),
            )
            .await
            .unwrap();

        let ReconfigureOutcome::Applied(change) = &result.outcome else {
            panic!("expected in-place edit, got {:?}", result.outcome);
        };
        assert_eq!(change.streak_change, StreakChange::Revoked);
        assert_eq!(result.cycle.current_streak(), 0);
        assert!(result.cycle.last_completed_date().is_none());

        let objectives = h.objectives_of(pathway.id()).await;
        assert_eq!(result.cycle.assigned_count(&objectives), 3);
        assert_eq!(completed_in(&result.cycle, &objectives), 1);
    }

    #[tokio::test]
    async fn immediate_frequency_change_restarts_window_timing() {
        let h = Harness::at("2024-01-17T10:00:00-08:00");
        let (pathway, _) = h.seed_cadence(Frequency::Daily, 1, 2).await;

        let result = h
            .state()
            .reconfigure_cadence_handler()
            .handle(
                command(pathway.id(), Frequency::Weekly, 1, true),
                CommandMetadata::user(),
            )
            .await
            .unwrap();

        assert_eq!(result.cycle.frequency(), Frequency::Weekly);
        assert_eq!(result.cycle.end_date(), Some(ts("2024-01-22T00:00:00-08:00")));
    }

    #[tokio::test]
    async fn deferred_edit_changes_only_the_count() {
        let h = Harness::at("2024-01-15T08:00:00-08:00");
        let (pathway, cycle) = h.seed_cadence(Frequency::Daily, 2, 5).await;

        let result = h
            .state()
            .reconfigure_cadence_handler()
            .handle(
                command(pathway.id(), Frequency::Daily, 4, false),
                CommandMetadata::user(),
            )
            .await
            .unwrap();

        assert_eq!(result.outcome, ReconfigureOutcome::Deferred);
        assert_eq!(result.cycle.required_count(), 4);
        assert_eq!(result.cycle.end_date(), cycle.end_date());
        assert_eq!(h.assigned_to(cycle.id()).await.len(), 2);
    }

    #[tokio::test]
    async fn deferred_frequency_change_is_rejected() {
        let h = Harness::at("2024-01-15T08:00:00-08:00");
        let (pathway, cycle) = h.seed_cadence(Frequency::Daily, 2, 5).await;
        let commits = h.store.commit_count();

        let err = h
            .state()
            .reconfigure_cadence_handler()
            .handle(
                command(pathway.id(), Frequency::Monthly, 2, false),
                CommandMetadata::user(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::DeferredFrequencyChange);
        assert_eq!(h.store.commit_count(), commits);
        assert_eq!(h.cycle(cycle.id()).await.frequency(), Frequency::Daily);
    }

    #[tokio::test]
    async fn immediate_none_disables_and_returns_unfinished_objectives() {
        let h = Harness::at("2024-01-15T08:00:00-08:00");
        let (pathway, cycle) = h.seed_cadence(Frequency::Daily, 3, 3).await;
        h.complete_assigned(&pathway, &cycle, 1).await;

        let result = h
            .state()
            .reconfigure_cadence_handler()
            .handle(
                command(pathway.id(), Frequency::None, 0, true),
                CommandMetadata::user(),
            )
            .await
            .unwrap();

        assert_eq!(result.outcome, ReconfigureOutcome::Disabled);
        assert!(!result.cycle.is_active());
        assert_eq!(result.cycle.current_streak(), 0);
        assert!(h.pathway(pathway.id()).await.active_cycle_id().is_none());
        assert_eq!(h.assigned_to(cycle.id()).await.len(), 1);
    }

    #[tokio::test]
    async fn immediate_edit_without_cadence_starts_one() {
        let h = Harness::at("2024-01-15T08:00:00-08:00");
        let pathway = h.seed_pathway(2).await;

        let result = h
            .state()
            .reconfigure_cadence_handler()
            .handle(
                command(pathway.id(), Frequency::Daily, 2, true),
                CommandMetadata::user(),
            )
            .await
            .unwrap();

        assert!(matches!(result.outcome, ReconfigureOutcome::Started(_)));
        assert_eq!(
            h.pathway(pathway.id()).await.active_cycle_id(),
            Some(result.cycle.id())
        );
    }

    #[tokio::test]
    async fn deferred_edit_without_cadence_is_rejected() {
        let h = Harness::at("2024-01-15T08:00:00-08:00");
        let pathway = h.seed_pathway(2).await;

        let err = h
            .state()
            .reconfigure_cadence_handler()
            .handle(
                command(pathway.id(), Frequency::Daily, 2, false),
                CommandMetadata::user(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::NoActiveCycle);
    }

    #[tokio::test]
    async fn expired_window_is_rolled_over_before_the_edit() {
        let h = Harness::at("2024-01-15T08:00:00-08:00");
        let (pathway, cycle) = h.seed_cadence(Frequency::Daily, 1, 5).await;
        h.complete_assigned(&pathway, &cycle, 1).await;
        // Day two missed, then an edit arrives before any sweep.
        h.clock.set(ts("2024-01-16T09:00:00-08:00"));
        h.state()
            .sweep_cycles_handler()
            .handle(SweepCyclesCommand, CommandMetadata::user())
            .await
            .unwrap();
        let stale = h.pathway(pathway.id()).await.active_cycle_id().unwrap();
        assert_eq!(h.cycle(stale).await.current_streak(), 1);
        h.clock.set(ts("2024-01-18T09:00:00-08:00"));

        let result = h
            .state()
            .reconfigure_cadence_handler()
            .handle(
                command(pathway.id(), Frequency::Daily, 3, true),
                CommandMetadata::user(),
            )
            .await
            .unwrap();

        let ended = result.rolled_over.unwrap();
        assert_eq!(ended.id(), stale);
        assert!(!ended.is_active());
        assert_ne!(result.cycle.id(), stale);
        assert_eq!(result.cycle.current_streak(), 0);
        assert_eq!(result.cycle.required_count(), 3);
        assert_eq!(result.cycle.end_date(), Some(ts("2024-01-19T00:00:00-08:00")));
        assert_eq!(h.assigned_to(result.cycle.id()).await.len(), 3);
        assert_eq!(
            h.pathway(pathway.id()).await.active_cycle_id(),
            Some(result.cycle.id())
        );
        assert_eq!(h.bus.events_of_type("cadence.cycles_reset.v1").len(), 2);

        // Nothing is left for the next sweep to do.
        let report = h
            .state()
            .sweep_cycles_handler()
            .handle(SweepCyclesCommand, CommandMetadata::user())
            .await
            .unwrap();
        assert!(!report.changed());
    }

    #[tokio::test]
    async fn lowered_count_cannot_credit_an_expired_window() {
        let h = Harness::at("2024-01-15T08:00:00-08:00");
        let (pathway, cycle) = h.seed_cadence(Frequency::Daily, 3, 5).await;
        h.complete_assigned(&pathway, &cycle, 1).await;
        h.clock.set(ts("2024-01-16T09:00:00-08:00"));

        let result = h
            .state()
            .reconfigure_cadence_handler()
            .handle(
                command(pathway.id(), Frequency::Daily, 1, true),
                CommandMetadata::user(),
            )
            .await
            .unwrap();

        let ended = h.cycle(cycle.id()).await;
        assert!(!ended.is_active());
        assert_eq!(ended.current_streak(), 0);
        assert_eq!(result.rolled_over.map(|c| c.id()), Some(cycle.id()));
        assert_eq!(result.cycle.current_streak(), 0);
        assert!(matches!(
            &result.outcome,
            ReconfigureOutcome::Applied(change) if change.streak_change == StreakChange::Unchanged
        ));
    }

    #[tokio::test]
    async fn deferred_edit_on_expired_window_lands_on_successor() {
        let h = Harness::at("2024-01-15T08:00:00-08:00");
        let (pathway, cycle) = h.seed_cadence(Frequency::Daily, 2, 5).await;
        h.clock.set(ts("2024-01-16T09:00:00-08:00"));

        let result = h
            .state()
            .reconfigure_cadence_handler()
            .handle(
                command(pathway.id(), Frequency::Daily, 4, false),
                CommandMetadata::user(),
            )
            .await
            .unwrap();

        assert_eq!(result.outcome, ReconfigureOutcome::Deferred);
        assert_eq!(h.cycle(cycle.id()).await.required_count(), 2);
        assert!(!h.cycle(cycle.id()).await.is_active());
        assert_eq!(result.cycle.required_count(), 4);
        assert_eq!(h.assigned_to(result.cycle.id()).await.len(), 2);
    }
}
