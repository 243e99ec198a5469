//! DisableCadenceHandler - Turns a pathway's cadence off.
//!
//! The active cycle becomes inactive with its end date set to now. Its
//! streak and completed objectives stay on the record; unfinished
//! objectives go back to the pathway's pool.

use std::sync::Arc;

use tracing::info;

use crate::domain::cadence::CadenceCycle;
use crate::domain::foundation::{CommandMetadata, DomainError, ErrorCode, ObjectiveId, PathwayId};
use crate::domain::pathway::{PathwayDidUpdate, PathwayUpdateReason};
use crate::ports::{
    ChangeSet, Clock, CycleRepository, EventPublisher, ObjectiveRepository, PathwayRepository,
    UnitOfWork,
};

use super::super::support::{envelope, publish_quietly};

/// Command to disable a cadence.
#[derive(Debug, Clone)]
pub struct DisableCadenceCommand {
    pub pathway_id: PathwayId,
}

/// Result of disabling a cadence.
#[derive(Debug, Clone)]
pub struct DisableCadenceResult {
    /// The now inactive cycle.
    pub cycle: CadenceCycle,
    /// Unfinished objectives returned to the pool.
    pub released: Vec<ObjectiveId>,
}

/// Handler for disabling cadences.
pub struct DisableCadenceHandler {
    pathway_repository: Arc<dyn PathwayRepository>,
    cycle_repository: Arc<dyn CycleRepository>,
    objective_repository: Arc<dyn ObjectiveRepository>,
    unit_of_work: Arc<dyn UnitOfWork>,
    clock: Arc<dyn Clock>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl DisableCadenceHandler {
    pub fn new(
        pathway_repository: Arc<dyn PathwayRepository>,
        cycle_repository: Arc<dyn CycleRepository>,
        objective_repository: Arc<dyn ObjectiveRepository>,
        unit_of_work: Arc<dyn UnitOfWork>,
        clock: Arc<dyn Clock>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            pathway_repository,
            cycle_repository,
            objective_repository,
            unit_of_work,
            clock,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: DisableCadenceCommand,
        metadata: CommandMetadata,
    ) -> Result<DisableCadenceResult, DomainError> {
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
        let cycle_id = pathway.active_cycle_id().ok_or_else(|| {
            DomainError::new(
                ErrorCode::NoActiveCycle,
                format!("Pathway {} has no active cadence", pathway.id()),
            )
        })?;
        let mut cycle = self
            .cycle_repository
            .find_by_id(&cycle_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::CycleNotFound,
                    format!("Active cycle {} not found", cycle_id),
                )
            })?;

        let now = self.clock.now();
        let mut objectives = self.objective_repository.find_by_cycle(&cycle_id).await?;

        cycle.disable(now)?;
        let released = cycle.release_unfinished(&mut objectives);
        pathway.clear_active_cycle();

        self.unit_of_work
            .commit(
                ChangeSet::for_pathway(pathway.id())
                    .with_pathway(pathway.clone())
                    .with_cycle(cycle.clone())
                    .with_objectives(objectives),
            )
            .await?;

        info!(
            pathway_id = %pathway.id(),
            cycle_id = %cycle_id,
            released = released.len(),
            "Cadence disabled"
        );

        let event = PathwayDidUpdate::new(pathway.id(), PathwayUpdateReason::CadenceDisabled, now);
        publish_quietly(
            self.event_publisher.as_ref(),
            envelope(&event, &metadata).into_iter().collect(),
        )
        .await;

        Ok(DisableCadenceResult { cycle, released })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::*;
    use crate::domain::foundation::Frequency;

    #[tokio::test]
    async fn disables_and_keeps_history() {
        let h = Harness::at("2024-01-15T08:00:00-08:00");
        let (pathway, cycle) = h.seed_cadence(Frequency::Daily, 2, 2).await;
        h.complete_assigned(&pathway, &cycle, 2).await;
        h.clock.set(ts("2024-01-15T18:00:00-08:00"));

        let result = h
            .state()
            .disable_cadence_handler()
            .handle(
                DisableCadenceCommand {
                    pathway_id: pathway.id(),
                },
                CommandMetadata::user(),
            )
            .await
            .unwrap();

        assert!(result.released.is_empty());
        let stored = h.cycle(cycle.id()).await;
        assert!(!stored.is_active());
        assert_eq!(stored.end_date(), Some(ts("2024-01-15T18:00:00-08:00")));
        assert_eq!(stored.current_streak(), 1);
        assert_eq!(h.assigned_to(cycle.id()).await.len(), 2);
        assert!(h.pathway(pathway.id()).await.active_cycle_id().is_none());
        assert_eq!(h.bus.events_of_type("pathway.updated.v1").len(), 1);
    }

    #[tokio::test]
    async fn unfinished_objectives_return_to_pool() {
        let h = Harness::at("2024-01-15T08:00:00-08:00");
        let (pathway, cycle) = h.seed_cadence(Frequency::Weekly, 3, 3).await;

        let result = h
            .state()
            .disable_cadence_handler()
            .handle(
                DisableCadenceCommand {
                    pathway_id: pathway.id(),
                },
                CommandMetadata::user(),
            )
            .await
            .unwrap();

        assert_eq!(result.released.len(), 3);
        assert!(h.assigned_to(cycle.id()).await.is_empty());
        assert!(h
            .objectives_of(pathway.id())
            .await
            .iter()
            .all(|o| o.is_available()));
    }

    #[tokio::test]
    async fn pathway_without_cadence_is_rejected() {
        let h = Harness::at("2024-01-15T08:00:00-08:00");
        let pathway = h.seed_pathway(1).await;

        let err = h
            .state()
            .disable_cadence_handler()
            .handle(
                DisableCadenceCommand {
                    pathway_id: pathway.id(),
                },
                CommandMetadata::user(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::NoActiveCycle);
    }
}
