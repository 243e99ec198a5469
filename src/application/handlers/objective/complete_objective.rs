//! CompleteObjectiveHandler - Marks an objective done and pays out its XP.
//!
//! XP goes to both the owning pathway and the global user. When the
//! objective belongs to the pathway's active window, the window is checked
//! for completion and may advance the streak.

use std::sync::Arc;

use tracing::info;

use crate::domain::cadence::{CadenceCycle, CycleCompleted};
use crate::domain::foundation::{
    CommandMetadata, DomainError, ErrorCode, EventId, ObjectiveId,
};
use crate::domain::objective::Objective;
use crate::domain::pathway::{PathwayDidUpdate, PathwayUpdateReason};
use crate::domain::progression::LevelChange;
use crate::ports::{
    ChangeSet, Clock, CycleRepository, EventPublisher, ObjectiveRepository, PathwayRepository,
    UnitOfWork, UserRepository,
};

use super::super::support::{envelope, publish_quietly};

/// Command to complete an objective.
#[derive(Debug, Clone)]
pub struct CompleteObjectiveCommand {
    pub objective_id: ObjectiveId,
}

/// Result of completing an objective.
#[derive(Debug, Clone)]
pub struct CompleteObjectiveResult {
    pub objective: Objective,
    pub xp_awarded: u32,
    /// Set when the pathway reached a new level.
    pub pathway_level_up: Option<LevelChange>,
    /// Set when the user reached a new level.
    pub user_level_up: Option<LevelChange>,
    /// The active window the objective counted toward, if any.
    pub cycle: Option<CadenceCycle>,
    /// True when this completion credited the window.
    pub streak_advanced: bool,
}

/// Handler for completing objectives.
pub struct CompleteObjectiveHandler {
    pathway_repository: Arc<dyn PathwayRepository>,
    cycle_repository: Arc<dyn CycleRepository>,
    objective_repository: Arc<dyn ObjectiveRepository>,
    user_repository: Arc<dyn UserRepository>,
    unit_of_work: Arc<dyn UnitOfWork>,
    clock: Arc<dyn Clock>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CompleteObjectiveHandler {
    pub fn new(
        pathway_repository: Arc<dyn PathwayRepository>,
        cycle_repository: Arc<dyn CycleRepository>,
        objective_repository: Arc<dyn ObjectiveRepository>,
        user_repository: Arc<dyn UserRepository>,
        unit_of_work: Arc<dyn UnitOfWork>,
        clock: Arc<dyn Clock>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            pathway_repository,
            cycle_repository,
            objective_repository,
            user_repository,
            unit_of_work,
            clock,
            event_publisher,
        }
    }

    /// # Errors
    ///
    /// - `ObjectiveNotFound` / `PathwayNotFound` for missing records
    /// - `ObjectiveAlreadyCompleted` on a repeat completion
    /// - `DatabaseError` if the commit fails
    pub async fn handle(
        &self,
        cmd: CompleteObjectiveCommand,
        metadata: CommandMetadata,
    ) -> Result<CompleteObjectiveResult, DomainError> {
        let mut objective = self
            .objective_repository
            .find_by_id(&cmd.objective_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::ObjectiveNotFound,
                    format!("Objective {} not found", cmd.objective_id),
                )
            })?;
        let mut pathway = self
            .pathway_repository
            .find_by_id(&objective.pathway_id())
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::PathwayNotFound,
                    format!("Pathway {} not found", objective.pathway_id()),
                )
            })?;

        let now = self.clock.now();
        objective.complete(now)?;

        let xp = objective.xp().value();
        let pathway_level_up = pathway.record_completion(xp);
        let mut user = self.user_repository.find_current().await?.unwrap_or_default();
        let user_level_up = user.record_completion(xp);

        let mut cycle = None;
        let mut streak_advanced = false;
        if let Some(cycle_id) = objective
            .cycle_id()
            .filter(|id| pathway.active_cycle_id() == Some(*id))
        {
            if let Some(mut active) = self.cycle_repository.find_by_id(&cycle_id).await? {
                let mut assigned = self.objective_repository.find_by_cycle(&cycle_id).await?;
                if let Some(slot) = assigned.iter_mut().find(|o| o.id() == objective.id()) {
                    *slot = objective.clone();
                }
                streak_advanced = active.check_completion(&assigned, now);
                cycle = Some(active);
            }
        }

        let mut changes = ChangeSet::for_pathway(pathway.id())
            .with_pathway(pathway.clone())
            .with_objectives([objective.clone()])
            .with_user(user);
        if let Some(active) = &cycle {
            changes = changes.with_cycle(active.clone());
        }
        self.unit_of_work.commit(changes).await?;

        info!(
            objective_id = %objective.id(),
            pathway_id = %pathway.id(),
            xp,
            streak_advanced,
            "Objective completed"
        );

        let mut envelopes = Vec::new();
        if let (true, Some(active)) = (streak_advanced, &cycle) {
            let completed = CycleCompleted {
                event_id: EventId::new(),
                cycle_id: active.id(),
                pathway_id: pathway.id(),
                streak: active.current_streak(),
                completed_at: now,
            };
            envelopes.extend(envelope(&completed, &metadata));
        }
        let updated =
            PathwayDidUpdate::new(pathway.id(), PathwayUpdateReason::ObjectiveCompleted, now);
        envelopes.extend(envelope(&updated, &metadata));
        publish_quietly(self.event_publisher.as_ref(), envelopes).await;

        Ok(CompleteObjectiveResult {
            objective,
            xp_awarded: xp,
            pathway_level_up,
            user_level_up,
            cycle,
            streak_advanced,
        })
    }
}
