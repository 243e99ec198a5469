//! Fixtures shared by handler tests.

use async_trait::async_trait;
use chrono::FixedOffset;
use std::sync::Arc;

use crate::adapters::allocation::RandomObjectiveGenerator;
use crate::adapters::clock::FixedClock;
use crate::adapters::events::InMemoryEventBus;
use crate::adapters::memory::InMemoryCadenceStore;
use crate::application::CadenceAppState;
use crate::domain::cadence::{AllocationContext, CadenceCycle, CadenceSettings, TimeframeCalculator};
use crate::domain::foundation::{
    CycleId, DomainError, ErrorCode, EventEnvelope, Frequency, PathwayId, Timestamp,
};
use crate::domain::objective::{GenerationRequest, Objective, ObjectiveGenerator, XpValue};
use crate::domain::pathway::Pathway;
use crate::ports::{
    ChangeSet, Clock, CycleRepository, EventPublisher, ObjectiveRepository, PathwayRepository,
    UnitOfWork,
};

pub fn ts(s: &str) -> Timestamp {
    Timestamp::parse_rfc3339(s).unwrap()
}

/// In-memory wiring with a pinned clock and a Pacific (-08:00) calendar.
pub struct Harness {
    pub store: Arc<InMemoryCadenceStore>,
    pub bus: Arc<InMemoryEventBus>,
    pub clock: Arc<FixedClock>,
    pub generator: Arc<RandomObjectiveGenerator>,
    pub calendar: TimeframeCalculator,
}

impl Harness {
    pub fn at(now: &str) -> Self {
        Self {
            store: Arc::new(InMemoryCadenceStore::new()),
            bus: Arc::new(InMemoryEventBus::new()),
            clock: Arc::new(FixedClock::new(ts(now))),
            generator: Arc::new(RandomObjectiveGenerator::seeded(17)),
            calendar: TimeframeCalculator::fixed(FixedOffset::west_opt(8 * 3600).unwrap()),
        }
    }

    pub fn state(&self) -> CadenceAppState {
        CadenceAppState::with_store(
            self.store.clone(),
            self.generator.clone(),
            self.calendar,
            self.clock.clone(),
            self.bus.clone(),
        )
    }

    /// Saves a pathway with `pool` unassigned 100 XP objectives.
    pub async fn seed_pathway(&self, pool: i32) -> Pathway {
        let pathway = Pathway::new("Fitness", None, 1, None, self.clock.now()).unwrap();
        let objectives: Vec<Objective> = (1..=pool)
            .map(|order| {
                Objective::new(pathway.id(), XpValue::new(100).unwrap(), order, self.clock.now())
            })
            .collect();
        self.store
            .commit(
                ChangeSet::for_pathway(pathway.id())
                    .with_pathway(pathway.clone())
                    .with_objectives(objectives),
            )
            .await
            .unwrap();
        pathway
    }

    /// Saves a pathway whose cadence started at the current clock instant.
    pub async fn seed_cadence(
        &self,
        frequency: Frequency,
        count: u32,
        pool: i32,
    ) -> (Pathway, CadenceCycle) {
        let mut pathway = self.seed_pathway(pool).await;
        let mut objectives = self.objectives_of(pathway.id()).await;
        let (cycle, _) = CadenceCycle::start(
            pathway.id(),
            CadenceSettings::new(frequency, count).unwrap(),
            &mut objectives,
            AllocationContext {
                generator: self.generator.as_ref(),
                calendar: &self.calendar,
                next_order: pool + 1,
                now: self.clock.now(),
            },
        )
        .unwrap();
        pathway.activate_cycle(cycle.id());
        self.store
            .commit(
                ChangeSet::for_pathway(pathway.id())
                    .with_pathway(pathway.clone())
                    .with_cycle(cycle.clone())
                    .with_objectives(objectives),
            )
            .await
            .unwrap();
        (pathway, cycle)
    }

    /// Completes `n` assigned objectives at the clock instant and credits the
    /// cycle, bypassing the handlers.
    pub async fn complete_assigned(&self, pathway: &Pathway, cycle: &CadenceCycle, n: usize) {
        let now = self.clock.now();
        let mut cycle = self.cycle(cycle.id()).await;
        let mut objectives = self.store.find_by_cycle(&cycle.id()).await.unwrap();
        for objective in objectives.iter_mut().filter(|o| !o.is_completed()).take(n) {
            objective.complete(now).unwrap();
        }
        cycle.check_completion(&objectives, now);
        self.store
            .commit(
                ChangeSet::for_pathway(pathway.id())
                    .with_cycle(cycle)
                    .with_objectives(objectives),
            )
            .await
            .unwrap();
    }

    pub async fn pathway(&self, id: PathwayId) -> Pathway {
        PathwayRepository::find_by_id(self.store.as_ref(), &id)
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn cycle(&self, id: CycleId) -> CadenceCycle {
        CycleRepository::find_by_id(self.store.as_ref(), &id)
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn cycles_of(&self, pathway_id: PathwayId) -> Vec<CadenceCycle> {
        self.store.find_by_pathway(&pathway_id).await.unwrap()
    }

    pub async fn objectives_of(&self, pathway_id: PathwayId) -> Vec<Objective> {
        self.store.objectives_of(&pathway_id).unwrap()
    }

    pub async fn assigned_to(&self, cycle_id: CycleId) -> Vec<Objective> {
        ObjectiveRepository::find_by_cycle(self.store.as_ref(), &cycle_id)
            .await
            .unwrap()
    }
}

/// Publisher that rejects every event.
pub struct FailingPublisher;

#[async_trait]
impl EventPublisher for FailingPublisher {
    async fn publish(&self, _: EventEnvelope) -> Result<(), DomainError> {
        Err(DomainError::new(ErrorCode::InternalError, "Publisher offline"))
    }

    async fn publish_all(&self, _: Vec<EventEnvelope>) -> Result<(), DomainError> {
        Err(DomainError::new(ErrorCode::InternalError, "Publisher offline"))
    }
}

/// Generator that always fails.
pub struct FailingGenerator;

impl ObjectiveGenerator for FailingGenerator {
    fn generate(&self, _: &GenerationRequest) -> Result<Vec<Objective>, DomainError> {
        Err(DomainError::new(ErrorCode::GenerationFailed, "Generator offline"))
    }
}
