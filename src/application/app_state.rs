//! Shared dependencies for building handlers.

use std::sync::Arc;

use crate::domain::cadence::TimeframeCalculator;
use crate::domain::objective::ObjectiveGenerator;
use crate::ports::{
    Clock, CycleRepository, EventPublisher, ObjectiveRepository, PathwayRepository, UnitOfWork,
    UserRepository,
};

use super::handlers::{
    CompleteObjectiveHandler, CreatePathwayHandler, DisableCadenceHandler, EnableCadenceHandler,
    GetCadenceStatusHandler, ReconfigureCadenceHandler, SweepCyclesHandler,
};

/// Every port and service a handler may need, wired once at startup.
#[derive(Clone)]
pub struct CadenceAppState {
    pub pathway_repository: Arc<dyn PathwayRepository>,
    pub cycle_repository: Arc<dyn CycleRepository>,
    pub objective_repository: Arc<dyn ObjectiveRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub unit_of_work: Arc<dyn UnitOfWork>,
    pub generator: Arc<dyn ObjectiveGenerator>,
    pub calendar: TimeframeCalculator,
    pub clock: Arc<dyn Clock>,
    pub event_publisher: Arc<dyn EventPublisher>,
}

impl CadenceAppState {
    /// Wires every store port to one backing store.
    pub fn with_store<S>(
        store: Arc<S>,
        generator: Arc<dyn ObjectiveGenerator>,
        calendar: TimeframeCalculator,
        clock: Arc<dyn Clock>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self
    where
        S: PathwayRepository
            + CycleRepository
            + ObjectiveRepository
            + UserRepository
            + UnitOfWork
            + 'static,
    {
        Self {
            pathway_repository: store.clone(),
            cycle_repository: store.clone(),
            objective_repository: store.clone(),
            user_repository: store.clone(),
            unit_of_work: store,
            generator,
            calendar,
            clock,
            event_publisher,
        }
    }

    pub fn sweep_cycles_handler(&self) -> SweepCyclesHandler {
        SweepCyclesHandler::new(
            self.pathway_repository.clone(),
            self.cycle_repository.clone(),
            self.objective_repository.clone(),
            self.unit_of_work.clone(),
            self.generator.clone(),
            self.calendar,
            self.clock.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn create_pathway_handler(&self) -> CreatePathwayHandler {
        CreatePathwayHandler::new(
            self.unit_of_work.clone(),
            self.generator.clone(),
            self.calendar,
            self.clock.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn enable_cadence_handler(&self) -> EnableCadenceHandler {
        EnableCadenceHandler::new(
            self.pathway_repository.clone(),
            self.objective_repository.clone(),
            self.unit_of_work.clone(),
            self.generator.clone(),
            self.calendar,
            self.clock.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn reconfigure_cadence_handler(&self) -> ReconfigureCadenceHandler {
        ReconfigureCadenceHandler::new(
            self.pathway_repository.clone(),
            self.cycle_repository.clone(),
            self.objective_repository.clone(),
            self.unit_of_work.clone(),
            self.generator.clone(),
            self.calendar,
            self.clock.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn disable_cadence_handler(&self) -> DisableCadenceHandler {
        DisableCadenceHandler::new(
            self.pathway_repository.clone(),
            self.cycle_repository.clone(),
            self.objective_repository.clone(),
            self.unit_of_work.clone(),
            self.clock.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn complete_objective_handler(&self) -> CompleteObjectiveHandler {
        CompleteObjectiveHandler::new(
            self.pathway_repository.clone(),
            self.cycle_repository.clone(),
            self.objective_repository.clone(),
            self.user_repository.clone(),
            self.unit_of_work.clone(),
            self.clock.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn get_cadence_status_handler(&self) -> GetCadenceStatusHandler {
        GetCadenceStatusHandler::new(
            self.pathway_repository.clone(),
            self.cycle_repository.clone(),
            self.objective_repository.clone(),
            self.calendar,
            self.clock.clone(),
        )
    }
}
