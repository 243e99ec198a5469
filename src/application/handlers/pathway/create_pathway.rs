//! CreatePathwayHandler - Adds a pathway, optionally with a running cadence.
//!
//! Without a cadence the pathway starts with a few unassigned objectives.
//! With one, the first window is opened and filled with freshly generated
//! objectives. Either way everything is saved in one commit.

use std::sync::Arc;

use tracing::info;

use crate::domain::cadence::{
    AllocationContext, CadenceCycle, CadenceSettings, TimeframeCalculator, WindowFill,
};
use crate::domain::foundation::{CommandMetadata, DomainError, Frequency};
use crate::domain::objective::{GenerationRequest, Objective, ObjectiveGenerator};
use crate::domain::pathway::{Pathway, PathwayDidUpdate, PathwayUpdateReason};
use crate::ports::{ChangeSet, Clock, EventPublisher, UnitOfWork};

use super::super::support::{envelope, publish_quietly, report_fill};

/// Objectives generated for a pathway created without a cadence.
pub const STARTER_OBJECTIVE_COUNT: u32 = 5;

/// Command to create a pathway.
#[derive(Debug, Clone)]
pub struct CreatePathwayCommand {
    pub name: String,
    pub description: Option<String>,
    pub color_index: u8,
    pub emoji: Option<String>,
    /// `Frequency::None` creates the pathway without a cadence.
    pub frequency: Frequency,
    pub required_count: u32,
}

/// Result of creating a pathway.
#[derive(Debug, Clone)]
pub struct CreatePathwayResult {
    pub pathway: Pathway,
    pub objectives: Vec<Objective>,
    pub cycle: Option<CadenceCycle>,
    /// How the first window was filled, when a cadence was requested.
    pub fill: Option<WindowFill>,
}

/// Handler for creating pathways.
pub struct CreatePathwayHandler {
    unit_of_work: Arc<dyn UnitOfWork>,
    generator: Arc<dyn ObjectiveGenerator>,
    calendar: TimeframeCalculator,
    clock: Arc<dyn Clock>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CreatePathwayHandler {
    pub fn new(
        unit_of_work: Arc<dyn UnitOfWork>,
        generator: Arc<dyn ObjectiveGenerator>,
        calendar: TimeframeCalculator,
        clock: Arc<dyn Clock>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            unit_of_work,
            generator,
            calendar,
            clock,
            event_publisher,
        }
    }

    /// # Errors
    ///
    /// - `ValidationFailed` for a bad name, colour or cadence count
    /// - `GenerationFailed` if starter objectives cannot be generated
    /// - `DatabaseError` if the commit fails
    pub async fn handle(
        &self,
        cmd: CreatePathwayCommand,
        metadata: CommandMetadata,
    ) -> Result<CreatePathwayResult, DomainError> {
        let settings = CadenceSettings::new(cmd.frequency, cmd.required_count)?;
        let now = self.clock.now();
        let mut pathway = Pathway::new(cmd.name, cmd.description, cmd.color_index, cmd.emoji, now)?;

        let mut objectives = Vec::new();
        let (cycle, fill) = if settings.is_disabled() {
            objectives = self.generator.generate(&GenerationRequest {
                pathway_id: pathway.id(),
                count: STARTER_OBJECTIVE_COUNT,
                first_order: 1,
                assign_to: None,
                created_at: now,
            })?;
            (None, None)
        } else {
            let ctx = AllocationContext {
                generator: self.generator.as_ref(),
                calendar: &self.calendar,
                next_order: 1,
                now,
            };
            let (cycle, fill) = CadenceCycle::start(pathway.id(), settings, &mut objectives, ctx)?;
            pathway.activate_cycle(cycle.id());
            report_fill(pathway.id(), &fill);
            (Some(cycle), Some(fill))
        };

        let mut changes = ChangeSet::for_pathway(pathway.id())
            .with_pathway(pathway.clone())
            .with_objectives(objectives.clone());
        if let Some(cycle) = &cycle {
            changes = changes.with_cycle(cycle.clone());
        }
        self.unit_of_work.commit(changes).await?;

        info!(
            pathway_id = %pathway.id(),
            frequency = %settings.frequency(),
            objectives = objectives.len(),
            "Pathway created"
        );

        let event = PathwayDidUpdate::new(pathway.id(), PathwayUpdateReason::Created, now);
        publish_quietly(
            self.event_publisher.as_ref(),
            envelope(&event, &metadata).into_iter().collect(),
        )
        .await;

        Ok(CreatePathwayResult {
            pathway,
            objectives,
            cycle,
            fill,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::*;
    use crate::domain::foundation::ErrorCode;

    fn command(frequency: Frequency, count: u32) -> CreatePathwayCommand {
        CreatePathwayCommand {
            name: "  Guitar  ".to_string(),
            description: Some("Practice".to_string()),
            color_index: 3,
            emoji: None,
            frequency,
            required_count: count,
        }
    }

    #[tokio::test]
    async fn without_cadence_seeds_starter_objectives() {
        let h = Harness::at("2024-01-15T08:00:00-08:00");

        let result = h
            .state()
            .create_pathway_handler()
            .handle(command(Frequency::None, 0), CommandMetadata::user())
            .await
            .unwrap();

        assert_eq!(result.pathway.name(), "Guitar");
        assert!(result.cycle.is_none());
        let stored = h.objectives_of(result.pathway.id()).await;
        assert_eq!(stored.len(), STARTER_OBJECTIVE_COUNT as usize);
        assert!(stored.iter().all(|o| o.is_available()));
        assert!(h.bus.has_event("pathway.updated.v1"));
    }

    #[tokio::test]
    async fn with_cadence_opens_first_window() {
        let h = Harness::at("2024-01-15T08:00:00-08:00");

        let result = h
            .state()
            .create_pathway_handler()
            .handle(command(Frequency::Monthly, 4), CommandMetadata::user())
            .await
            .unwrap();

        let cycle = result.cycle.unwrap();
        assert_eq!(cycle.end_date(), Some(ts("2024-02-01T00:00:00-08:00")));
        assert_eq!(result.fill.unwrap().generated.len(), 4);
        assert_eq!(h.assigned_to(cycle.id()).await.len(), 4);
        assert_eq!(
            h.pathway(result.pathway.id()).await.active_cycle_id(),
            Some(cycle.id())
        );
    }

    #[tokio::test]
    async fn invalid_input_saves_nothing() {
        let h = Harness::at("2024-01-15T08:00:00-08:00");
        let handler = h.state().create_pathway_handler();

        let blank = handler
            .handle(
                CreatePathwayCommand {
                    name: "   ".to_string(),
                    ..command(Frequency::None, 0)
                },
                CommandMetadata::user(),
            )
            .await
            .unwrap_err();
        let too_many = handler
            .handle(command(Frequency::Daily, 51), CommandMetadata::user())
            .await
            .unwrap_err();

        assert_eq!(blank.code, ErrorCode::ValidationFailed);
        assert_eq!(too_many.code, ErrorCode::ValidationFailed);
        assert_eq!(h.store.commit_count(), 0);
    }
}
