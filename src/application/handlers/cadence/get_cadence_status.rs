//! GetCadenceStatusHandler - Query for the state of a pathway's cadence.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::cadence::{CyclePhase, StreakAnomaly, StreakAudit, TimeframeCalculator};
use crate::domain::foundation::{CycleId, DomainError, ErrorCode, Frequency, PathwayId, Timestamp};
use crate::ports::{Clock, CycleRepository, ObjectiveRepository, PathwayRepository};

/// Query for the current cadence window of a pathway.
#[derive(Debug, Clone)]
pub struct GetCadenceStatusQuery {
    pub pathway_id: PathwayId,
}

/// Snapshot of the active window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CadenceStatus {
    pub pathway_id: PathwayId,
    pub cycle_id: CycleId,
    pub frequency: Frequency,
    pub required_count: u32,
    pub assigned_count: u32,
    pub completed_count: u32,
    /// Completed over required, clamped to `[0, 1]`.
    pub progress: f64,
    pub phase: CyclePhase,
    pub current_streak: u32,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    /// Negative once the window has passed without a sweep.
    pub seconds_until_expiry: Option<i64>,
    pub missed_windows: u32,
    pub anomalies: Vec<StreakAnomaly>,
}

/// Handler for cadence status queries.
pub struct GetCadenceStatusHandler {
    pathway_repository: Arc<dyn PathwayRepository>,
    cycle_repository: Arc<dyn CycleRepository>,
    objective_repository: Arc<dyn ObjectiveRepository>,
    calendar: TimeframeCalculator,
    clock: Arc<dyn Clock>,
}

impl GetCadenceStatusHandler {
    pub fn new(
        pathway_repository: Arc<dyn PathwayRepository>,
        cycle_repository: Arc<dyn CycleRepository>,
        objective_repository: Arc<dyn ObjectiveRepository>,
        calendar: TimeframeCalculator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pathway_repository,
            cycle_repository,
            objective_repository,
            calendar,
            clock,
        }
    }

    /// Returns `None` when the pathway has no active cadence.
    pub async fn handle(
        &self,
        query: GetCadenceStatusQuery,
    ) -> Result<Option<CadenceStatus>, DomainError> {
        let pathway = self
            .pathway_repository
            .find_by_id(&query.pathway_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::PathwayNotFound,
                    format!("Pathway {} not found", query.pathway_id),
                )
            })?;
        let Some(cycle_id) = pathway.active_cycle_id() else {
            return Ok(None);
        };

        let history = self.cycle_repository.find_by_pathway(&pathway.id()).await?;
        let Some(cycle) = history.iter().find(|c| c.id() == cycle_id) else {
            return Err(DomainError::new(
                ErrorCode::CycleNotFound,
                format!("Active cycle {} not found", cycle_id),
            ));
        };
        let previous = history
            .iter()
            .filter(|c| !c.is_active() && c.start_date() <= cycle.start_date())
            .max_by_key(|c| c.start_date());

        let now = self.clock.now();
        let objectives = self.objective_repository.find_by_cycle(&cycle_id).await?;

        Ok(Some(CadenceStatus {
            pathway_id: pathway.id(),
            cycle_id,
            frequency: cycle.frequency(),
            required_count: cycle.required_count(),
            assigned_count: cycle.assigned_count(&objectives),
            completed_count: cycle.completed_objectives_count(&objectives),
            progress: cycle.progress(&objectives),
            phase: cycle.phase(now),
            current_streak: cycle.current_streak(),
            start_date: cycle.start_date(),
            end_date: cycle.end_date(),
            seconds_until_expiry: cycle.time_until_expiry(now).map(|d| d.num_seconds()),
            missed_windows: cycle.missed_windows(now, &self.calendar),
            anomalies: StreakAudit::new(&self.calendar).inspect(cycle, previous, now),
        }))
    }
}
