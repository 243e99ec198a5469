//! End-to-end cadence behaviour over the in-memory store.
//!
//! Every step goes through the public handlers, the way the binary and any
//! UI layer drive the crate.

use std::sync::Arc;

use chrono::FixedOffset;

use xp_cadence::adapters::{
    FixedClock, InMemoryCadenceStore, InMemoryEventBus, RandomObjectiveGenerator,
};
use xp_cadence::application::{
    CadenceAppState, CompleteObjectiveCommand, CreatePathwayCommand, CreatePathwayResult,
    GetCadenceStatusQuery, ReconfigureCadenceCommand, ReconfigureOutcome, SweepCyclesCommand,
    SweepReport,
};
use xp_cadence::domain::cadence::{CadenceCycle, StreakChange, TimeframeCalculator};
use xp_cadence::domain::foundation::{
    CommandMetadata, CycleId, ErrorCode, Frequency, PathwayId, Timestamp,
};
use xp_cadence::domain::objective::Objective;
use xp_cadence::domain::pathway::Pathway;
use xp_cadence::ports::{
    CycleRepository, ObjectiveRepository, PathwayRepository, UserRepository,
};

fn ts(s: &str) -> Timestamp {
    Timestamp::parse_rfc3339(s).unwrap()
}

struct App {
    store: Arc<InMemoryCadenceStore>,
    bus: Arc<InMemoryEventBus>,
    clock: Arc<FixedClock>,
    state: CadenceAppState,
}

impl App {
    /// Pacific-time app with the clock pinned at `now`.
    fn at(now: &str) -> Self {
        let store = Arc::new(InMemoryCadenceStore::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let clock = Arc::new(FixedClock::new(ts(now)));
        let state = CadenceAppState::with_store(
            store.clone(),
            Arc::new(RandomObjectiveGenerator::seeded(7)),
            TimeframeCalculator::fixed(FixedOffset::west_opt(8 * 3600).unwrap()),
            clock.clone(),
            bus.clone(),
        );
        Self {
            store,
            bus,
            clock,
            state,
        }
    }

    async fn create(&self, name: &str, frequency: Frequency, count: u32) -> CreatePathwayResult {
        self.state
            .create_pathway_handler()
            .handle(
                CreatePathwayCommand {
                    name: name.to_string(),
                    description: None,
                    color_index: 0,
                    emoji: None,
                    frequency,
                    required_count: count,
                },
                CommandMetadata::user(),
            )
            .await
            .unwrap()
    }

    async fn complete(&self, objective: &Objective) {
        self.state
            .complete_objective_handler()
            .handle(
                CompleteObjectiveCommand {
                    objective_id: objective.id(),
                },
                CommandMetadata::user(),
            )
            .await
            .unwrap();
    }

    async fn sweep(&self) -> SweepReport {
        self.state
            .sweep_cycles_handler()
            .handle(SweepCyclesCommand, CommandMetadata::new("foreground"))
            .await
            .unwrap()
    }

    async fn pathway(&self, id: PathwayId) -> Pathway {
        PathwayRepository::find_by_id(self.store.as_ref(), &id)
            .await
            .unwrap()
            .unwrap()
    }

    async fn active_cycle(&self, id: PathwayId) -> CadenceCycle {
        let cycle_id = self.pathway(id).await.active_cycle_id().unwrap();
        self.cycle(cycle_id).await
    }

    async fn cycle(&self, id: CycleId) -> CadenceCycle {
        CycleRepository::find_by_id(self.store.as_ref(), &id)
            .await
            .unwrap()
            .unwrap()
    }

    async fn assigned_to(&self, id: CycleId) -> Vec<Objective> {
        ObjectiveRepository::find_by_cycle(self.store.as_ref(), &id)
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn daily_window_streak_carries_into_next_day() {
    let app = App::at("2024-01-15T08:00:00-08:00");
    let created = app.create("Fitness", Frequency::Daily, 3).await;
    let first = created.cycle.unwrap();
    assert_eq!(first.end_date(), Some(ts("2024-01-16T00:00:00-08:00")));
    assert_eq!(first.current_streak(), 0);

    let done = app.assigned_to(first.id()).await;
    for objective in &done {
        app.complete(objective).await;
    }
    let credited = app.cycle(first.id()).await;
    assert_eq!(credited.current_streak(), 1);
    assert!(credited.last_completed_date().is_some());

    app.clock.set(ts("2024-01-16T00:30:00-08:00"));
    let report = app.sweep().await;

    assert_eq!(report.advanced.len(), 1);
    let next = app.active_cycle(created.pathway.id()).await;
    assert_ne!(next.id(), first.id());
    assert_eq!(next.start_date(), ts("2024-01-16T00:30:00-08:00"));
    assert_eq!(next.end_date(), Some(ts("2024-01-17T00:00:00-08:00")));
    assert_eq!(next.current_streak(), 1);
    let carried = app.assigned_to(next.id()).await;
    assert_eq!(carried.len(), 3);
    assert!(carried.iter().all(|o| !o.is_completed()));
    assert!(carried.iter().all(|o| done.iter().all(|d| d.id() != o.id())));

    // Rollover clears the old window's assignments; the cycle record stays.
    let ended = app.cycle(first.id()).await;
    assert!(!ended.is_active());
    assert_eq!(ended.last_completed_date(), credited.last_completed_date());
    assert!(app.assigned_to(first.id()).await.is_empty());
}

#[tokio::test]
async fn weekly_window_created_midweek_ends_next_monday() {
    let app = App::at("2024-01-17T10:00:00-08:00");

    let created = app.create("Reading", Frequency::Weekly, 2).await;

    assert_eq!(
        created.cycle.unwrap().end_date(),
        Some(ts("2024-01-22T00:00:00-08:00"))
    );
}

#[tokio::test]
async fn missed_window_breaks_streak() {
    let app = App::at("2024-01-15T08:00:00-08:00");
    let created = app.create("Fitness", Frequency::Daily, 1).await;
    let first = created.cycle.unwrap();
    app.complete(&app.assigned_to(first.id()).await[0]).await;

    // Day two passes with nothing done.
    app.clock.set(ts("2024-01-16T09:00:00-08:00"));
    app.sweep().await;
    app.clock.set(ts("2024-01-17T09:00:00-08:00"));
    let report = app.sweep().await;

    assert_eq!(report.advanced[0].streak, 0);
    assert_eq!(app.active_cycle(created.pathway.id()).await.current_streak(), 0);
}

#[tokio::test]
async fn late_sweep_reports_missed_windows_and_catches_up_once() {
    let app = App::at("2024-01-15T08:00:00-08:00");
    let created = app.create("Fitness", Frequency::Daily, 1).await;

    app.clock.set(ts("2024-01-18T15:30:00-08:00"));
    let status = app
        .state
        .get_cadence_status_handler()
        .handle(GetCadenceStatusQuery {
            pathway_id: created.pathway.id(),
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(status.missed_windows, 1);

    let report = app.sweep().await;

    assert_eq!(report.advanced[0].missed_windows, 1);
    let history = app
        .state
        .cycle_repository
        .find_by_pathway(&created.pathway.id())
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(
        app.active_cycle(created.pathway.id()).await.end_date(),
        Some(ts("2024-01-19T00:00:00-08:00"))
    );
}

#[tokio::test]
async fn repeated_sweeps_change_nothing_further() {
    let app = App::at("2024-01-15T08:00:00-08:00");
    let created = app.create("Fitness", Frequency::Daily, 2).await;
    app.clock.set(ts("2024-01-16T08:00:00-08:00"));

    let first = app.sweep().await;
    let cycle_after_first = app.active_cycle(created.pathway.id()).await;
    let commits = app.store.commit_count();
    let second = app.sweep().await;

    assert!(first.changed());
    assert!(!second.changed());
    assert_eq!(app.store.commit_count(), commits);
    assert_eq!(app.active_cycle(created.pathway.id()).await, cycle_after_first);
    assert_eq!(app.bus.events_of_type("cadence.cycles_reset.v1").len(), 1);
}

#[tokio::test]
async fn one_reset_event_covers_every_advanced_pathway() {
    let app = App::at("2024-01-15T08:00:00-08:00");
    let fitness = app.create("Fitness", Frequency::Daily, 1).await;
    let reading = app.create("Reading", Frequency::Daily, 2).await;
    let music = app.create("Music", Frequency::Weekly, 2).await;
    app.clock.set(ts("2024-01-16T08:00:00-08:00"));

    let report = app.sweep().await;

    let event = report.event.unwrap();
    assert_eq!(event.pathway_ids.len(), 2);
    assert!(event.pathway_ids.contains(&fitness.pathway.id()));
    assert!(event.pathway_ids.contains(&reading.pathway.id()));
    assert!(!event.pathway_ids.contains(&music.pathway.id()));
    assert_eq!(app.bus.events_of_type("cadence.cycles_reset.v1").len(), 1);
}

#[tokio::test]
async fn failing_pathway_does_not_block_the_rest() {
    let app = App::at("2024-01-15T08:00:00-08:00");
    let broken = app.create("Broken", Frequency::Daily, 1).await;
    let healthy = app.create("Healthy", Frequency::Daily, 1).await;
    let stuck_cycle = broken.cycle.unwrap();
    app.store.fail_commits_for(broken.pathway.id());
    app.clock.set(ts("2024-01-16T08:00:00-08:00"));

    let report = app.sweep().await;

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].pathway_id, broken.pathway.id());
    assert_eq!(report.failures[0].error.code, ErrorCode::DatabaseError);
    assert_eq!(report.advanced.len(), 1);
    assert_eq!(report.advanced[0].pathway_id, healthy.pathway.id());
    assert_eq!(app.active_cycle(broken.pathway.id()).await, stuck_cycle);

    // The next sweep picks up the pathway once the store recovers.
    app.store.restore_commits_for(&broken.pathway.id());
    let retry = app.sweep().await;
    assert_eq!(retry.advanced.len(), 1);
    assert_eq!(retry.advanced[0].pathway_id, broken.pathway.id());
}

#[tokio::test]
async fn lowering_target_credits_window_and_frees_the_rest() {
    let app = App::at("2024-01-15T08:00:00-08:00");
    let created = app.create("Fitness", Frequency::Daily, 3).await;
    let cycle = created.cycle.unwrap();
    let done = app.assigned_to(cycle.id()).await.remove(0);
    app.complete(&done).await;

    let result = app
        .state
        .reconfigure_cadence_handler()
        .handle(
            ReconfigureCadenceCommand {
                pathway_id: created.pathway.id(),
                frequency: Frequency::Daily,
                required_count: 1,
                apply_immediately: true,
            },
            CommandMetadata::user(),
        )
        .await
        .unwrap();

    match result.outcome {
        ReconfigureOutcome::Applied(reconfiguration) => {
            assert_eq!(reconfiguration.streak_change, StreakChange::Advanced);
            assert_eq!(reconfiguration.fill.released.len(), 2);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    let stored = app.cycle(cycle.id()).await;
    assert_eq!(stored.current_streak(), 1);
    assert!(stored.last_completed_date().is_some());
    let assigned = app.assigned_to(cycle.id()).await;
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].id(), done.id());
}

#[tokio::test]
async fn reconfiguration_never_drops_completed_objectives() {
    let app = App::at("2024-01-15T08:00:00-08:00");
    let created = app.create("Fitness", Frequency::Daily, 3).await;
    let cycle = created.cycle.unwrap();
    for objective in app.assigned_to(cycle.id()).await {
        app.complete(&objective).await;
    }
    let handler = app.state.reconfigure_cadence_handler();

    for (frequency, count) in [(Frequency::Weekly, 1), (Frequency::Monthly, 5)] {
        handler
            .handle(
                ReconfigureCadenceCommand {
                    pathway_id: created.pathway.id(),
                    frequency,
                    required_count: count,
                    apply_immediately: true,
                },
                CommandMetadata::user(),
            )
            .await
            .unwrap();

        let completed = app
            .assigned_to(cycle.id())
            .await
            .into_iter()
            .filter(Objective::is_completed)
            .count();
        assert_eq!(completed, 3);
    }

    let stored = app.cycle(cycle.id()).await;
    assert_eq!(stored.frequency(), Frequency::Monthly);
    assert_eq!(stored.end_date(), Some(ts("2024-02-01T00:00:00-08:00")));
    assert_eq!(app.assigned_to(cycle.id()).await.len(), 5);
}

#[tokio::test]
async fn editing_after_a_missed_window_resets_the_streak_first() {
    let app = App::at("2024-01-15T08:00:00-08:00");
    let created = app.create("Fitness", Frequency::Daily, 1).await;
    let first = created.cycle.unwrap();
    for objective in app.assigned_to(first.id()).await {
        app.complete(&objective).await;
    }
    app.clock.set(ts("2024-01-16T09:00:00-08:00"));
    app.sweep().await;
    let second = app.active_cycle(created.pathway.id()).await;
    assert_eq!(second.current_streak(), 1);

    // Day two goes by with nothing done and no sweep before the edit.
    app.clock.set(ts("2024-01-17T09:00:00-08:00"));
    let result = app
        .state
        .reconfigure_cadence_handler()
        .handle(
            ReconfigureCadenceCommand {
                pathway_id: created.pathway.id(),
                frequency: Frequency::Daily,
                required_count: 2,
                apply_immediately: true,
            },
            CommandMetadata::user(),
        )
        .await
        .unwrap();

    assert_eq!(result.rolled_over.map(|c| c.id()), Some(second.id()));
    assert!(!app.cycle(second.id()).await.is_active());
    let current = app.active_cycle(created.pathway.id()).await;
    assert_eq!(current.id(), result.cycle.id());
    assert_eq!(current.current_streak(), 0);
    assert_eq!(current.required_count(), 2);
    assert_eq!(current.end_date(), Some(ts("2024-01-18T00:00:00-08:00")));
    assert!(!app.sweep().await.changed());
}

#[tokio::test]
async fn xp_accumulates_across_pathways() {
    let app = App::at("2024-01-15T08:00:00-08:00");
    let fitness = app.create("Fitness", Frequency::None, 0).await;
    let reading = app.create("Reading", Frequency::None, 0).await;

    app.complete(&fitness.objectives[0]).await;
    app.complete(&reading.objectives[0]).await;

    let expected = fitness.objectives[0].xp().value() + reading.objectives[0].xp().value();
    let user = app.state.user_repository.find_current().await.unwrap().unwrap();
    assert_eq!(user.objectives_completed(), 2);
    let progression = user.progression();
    if expected < 1000 {
        assert_eq!((progression.level(), progression.xp()), (1, expected));
    } else {
        assert_eq!((progression.level(), progression.xp()), (2, expected - 1000));
    }
    assert_eq!(app.pathway(fitness.pathway.id()).await.objectives_completed(), 1);
}
