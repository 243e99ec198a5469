//! EnableCadenceHandler - Starts a cadence on a pathway that has none.

use std::sync::Arc;

use tracing::info;

use crate::domain::cadence::{
    AllocationContext, CadenceCycle, CadenceSettings, TimeframeCalculator, WindowFill,
};
use crate::domain::foundation::{CommandMetadata, DomainError, ErrorCode, Frequency, PathwayId};
use crate::domain::objective::ObjectiveGenerator;
use crate::domain::pathway::{PathwayDidUpdate, PathwayUpdateReason};
use crate::ports::{ChangeSet, Clock, EventPublisher, ObjectiveRepository, PathwayRepository, UnitOfWork};

use super::super::support::{
    envelope, load_working_set, next_order, publish_quietly, report_fill,
};

/// Command to start a cadence.
#[derive(Debug, Clone)]
pub struct EnableCadenceCommand {
    pub pathway_id: PathwayId,
    pub frequency: Frequency,
    pub required_count: u32,
}

/// Result of enabling a cadence.
#[derive(Debug, Clone)]
pub struct EnableCadenceResult {
    pub cycle: CadenceCycle,
    pub fill: WindowFill,
}

/// Handler for enabling cadences.
pub struct EnableCadenceHandler {
    pathway_repository: Arc<dyn PathwayRepository>,
    objective_repository: Arc<dyn ObjectiveRepository>,
    unit_of_work: Arc<dyn UnitOfWork>,
    generator: Arc<dyn ObjectiveGenerator>,
    calendar: TimeframeCalculator,
    clock: Arc<dyn Clock>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl EnableCadenceHandler {
    pub fn new(
        pathway_repository: Arc<dyn PathwayRepository>,
        objective_repository: Arc<dyn ObjectiveRepository>,
        unit_of_work: Arc<dyn UnitOfWork>,
        generator: Arc<dyn ObjectiveGenerator>,
        calendar: TimeframeCalculator,
        clock: Arc<dyn Clock>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            pathway_repository,
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
    /// - `ValidationFailed` for a `None` frequency or an out-of-range count
    /// - `PathwayNotFound` if the pathway does not exist
    /// - `CadenceAlreadyEnabled` if the pathway has an active cycle
    /// - `DatabaseError` if the commit fails
    pub async fn handle(
        &self,
        cmd: EnableCadenceCommand,
        metadata: CommandMetadata,
    ) -> Result<EnableCadenceResult, DomainError> {
        if cmd.frequency.is_none() {
            return Err(DomainError::validation(
                "frequency",
                "A cadence needs a daily, weekly or monthly frequency",
            ));
        }
        let settings = CadenceSettings::new(cmd.frequency, cmd.required_count)?;

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
        if let Some(active) = pathway.active_cycle_id() {
            return Err(DomainError::new(
                ErrorCode::CadenceAlreadyEnabled,
                format!("Pathway {} already has an active cadence", pathway.id()),
            )
            .with_detail("cycle_id", active.to_string()));
        }

        let now = self.clock.now();
        let mut objectives = load_working_set(
            self.objective_repository.as_ref(),
            pathway.id(),
            None,
            settings.required_count(),
        )
        .await?;
        let ctx = AllocationContext {
            generator: self.generator.as_ref(),
            calendar: &self.calendar,
            next_order: next_order(self.objective_repository.as_ref(), pathway.id()).await?,
            now,
        };

        let (cycle, fill) = CadenceCycle::start(pathway.id(), settings, &mut objectives, ctx)?;
        pathway.activate_cycle(cycle.id());
        report_fill(pathway.id(), &fill);

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
            cycle_id = %cycle.id(),
            frequency = %cycle.frequency(),
            required_count = cycle.required_count(),
            "Cadence enabled"
        );

        let event = PathwayDidUpdate::new(pathway.id(), PathwayUpdateReason::CadenceEnabled, now);
        publish_quietly(
            self.event_publisher.as_ref(),
            envelope(&event, &metadata).into_iter().collect(),
        )
        .await;

        Ok(EnableCadenceResult { cycle, fill })
    }
}
