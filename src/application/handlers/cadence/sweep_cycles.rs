//! SweepCyclesHandler - Moves every expired cadence into its next window.
//!
//! Runs on app foreground, on the periodic timer, and on demand. For each
//! pathway with an active cycle that has expired:
//!
//! 1. The expired cycle is ended and kept as history
//! 2. A successor with the same frequency and count is opened and filled
//! 3. The pathway points at the successor
//!
//! Each pathway is committed on its own, so one failing pathway never
//! blocks the rest. A sweep that changed anything publishes a single
//! `CyclesDidReset` event listing every advanced pathway.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::cadence::{
    AllocationContext, CadenceCycle, CyclesDidReset, StreakAudit, TimeframeCalculator,
};
use crate::domain::foundation::{
    CommandMetadata, CycleId, DomainError, ErrorCode, EventId, PathwayId, Timestamp,
};
use crate::domain::objective::ObjectiveGenerator;
use crate::domain::pathway::Pathway;
use crate::ports::{
    ChangeSet, Clock, CycleRepository, EventPublisher, ObjectiveRepository, PathwayRepository,
    UnitOfWork,
};

use super::super::support::{
    envelope, load_working_set, next_order, publish_quietly, report_fill,
};

/// Command to sweep all cadences. Carries no input; the instant comes from
/// the clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepCyclesCommand;

/// One pathway moved into a new window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvancedPathway {
    pub pathway_id: PathwayId,
    pub ended_cycle_id: CycleId,
    pub new_cycle_id: CycleId,
    /// Streak carried into the new window (0 after a miss).
    pub streak: u32,
    /// Whole windows that passed with no sweep; catch-up stays single-step.
    pub missed_windows: u32,
    /// Slots of the new window left without an objective.
    pub shortfall: u32,
}

/// A pathway the sweep could not advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepFailure {
    pub pathway_id: PathwayId,
    pub error: DomainError,
}

/// Result of one sweep.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub advanced: Vec<AdvancedPathway>,
    pub failures: Vec<SweepFailure>,
    /// The batched event, present only when something changed.
    pub event: Option<CyclesDidReset>,
}

impl SweepReport {
    /// True when at least one pathway advanced.
    pub fn changed(&self) -> bool {
        !self.advanced.is_empty()
    }
}

/// Handler for cadence sweeps.
pub struct SweepCyclesHandler {
    pathway_repository: Arc<dyn PathwayRepository>,
    cycle_repository: Arc<dyn CycleRepository>,
    objective_repository: Arc<dyn ObjectiveRepository>,
    unit_of_work: Arc<dyn UnitOfWork>,
    generator: Arc<dyn ObjectiveGenerator>,
    calendar: TimeframeCalculator,
    clock: Arc<dyn Clock>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl SweepCyclesHandler {
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

    /// Sweeps every pathway with an active cycle.
    ///
    /// # Errors
    ///
    /// Only the initial pathway listing can fail the sweep as a whole;
    /// per-pathway failures are collected in the report.
    pub async fn handle(
        &self,
        _cmd: SweepCyclesCommand,
        metadata: CommandMetadata,
    ) -> Result<SweepReport, DomainError> {
        let now = self.clock.now();
        let pathways = self.pathway_repository.find_with_active_cycle().await?;
        debug!(pathways = pathways.len(), trigger = metadata.trigger(), "Sweeping cadences");

        let mut report = SweepReport::default();
        for pathway in pathways {
            let pathway_id = pathway.id();
            match self.sweep_pathway(pathway, now).await {
                Ok(Some(advanced)) => report.advanced.push(advanced),
                Ok(None) => {}
                Err(err) => {
                    error!(pathway_id = %pathway_id, error = %err, "Failed to advance cadence");
                    report.failures.push(SweepFailure {
                        pathway_id,
                        error: err,
                    });
                }
            }
        }

        if report.changed() {
            let event = CyclesDidReset {
                event_id: EventId::new(),
                pathway_ids: report.advanced.iter().map(|a| a.pathway_id).collect(),
                reset_at: now,
            };
            if let Some(envelope) = envelope(&event, &metadata) {
                publish_quietly(self.event_publisher.as_ref(), vec![envelope]).await;
            }
            report.event = Some(event);
            info!(
                advanced = report.advanced.len(),
                failed = report.failures.len(),
                "Cadence sweep advanced cycles"
            );
        }

        Ok(report)
    }

    async fn sweep_pathway(
        &self,
        mut pathway: Pathway,
        now: Timestamp,
    ) -> Result<Option<AdvancedPathway>, DomainError> {
        let Some(cycle_id) = pathway.active_cycle_id() else {
            return Ok(None);
        };
        let mut cycle = self
            .cycle_repository
            .find_by_id(&cycle_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::CycleNotFound,
                    format!("Active cycle {} not found", cycle_id),
                )
                .with_detail("pathway_id", pathway.id().to_string())
            })?;

        if !cycle.is_expired(now) {
            return Ok(None);
        }

        let missed_windows = cycle.missed_windows(now, &self.calendar);
        let mut objectives = load_working_set(
            self.objective_repository.as_ref(),
            pathway.id(),
            Some(cycle_id),
            cycle.required_count(),
        )
        .await?;
        let ctx = AllocationContext {
            generator: self.generator.as_ref(),
            calendar: &self.calendar,
            next_order: next_order(self.objective_repository.as_ref(), pathway.id()).await?,
            now,
        };

        let (successor, fill) = cycle.roll_over(&mut objectives, ctx)?;
        pathway.activate_cycle(successor.id());

        report_fill(pathway.id(), &fill);
        self.audit(&successor, &cycle, now);

        let advanced = AdvancedPathway {
            pathway_id: pathway.id(),
            ended_cycle_id: cycle.id(),
            new_cycle_id: successor.id(),
            streak: successor.current_streak(),
            missed_windows,
            shortfall: fill.shortfall,
        };

        self.unit_of_work
            .commit(
                ChangeSet::for_pathway(pathway.id())
                    .with_pathway(pathway)
                    .with_cycle(cycle)
                    .with_cycle(successor)
                    .with_objectives(objectives),
            )
            .await?;

        Ok(Some(advanced))
    }

    fn audit(&self, successor: &CadenceCycle, ended: &CadenceCycle, now: Timestamp) {
        for anomaly in StreakAudit::new(&self.calendar).inspect(successor, Some(ended), now) {
            warn!(
                pathway_id = %successor.pathway_id(),
                cycle_id = %successor.id(),
                %anomaly,
                "Streak inconsistency"
            );
        }
    }
}
