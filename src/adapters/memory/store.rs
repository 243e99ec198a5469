//! In-memory implementation of every store port.
//!
//! One `RwLock` guards the whole state so a commit is applied atomically:
//! the change set is staged on a copy, checked for referential integrity,
//! and swapped in only when valid.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::domain::cadence::CadenceCycle;
use crate::domain::foundation::{CycleId, DomainError, ObjectiveId, PathwayId};
use crate::domain::objective::Objective;
use crate::domain::pathway::Pathway;
use crate::domain::user::User;
use crate::ports::{
    ChangeSet, CycleRepository, ObjectiveRepository, PathwayRepository, UnitOfWork,
    UserRepository,
};

#[derive(Debug, Clone, Default)]
struct StoreState {
    pathways: HashMap<PathwayId, Pathway>,
    cycles: HashMap<CycleId, CadenceCycle>,
    objectives: HashMap<ObjectiveId, Objective>,
    user: Option<User>,
}

impl StoreState {
    fn apply(&mut self, changes: ChangeSet) {
        for pathway in changes.pathways {
            self.pathways.insert(pathway.id(), pathway);
        }
        for cycle in changes.cycles {
            self.cycles.insert(cycle.id(), cycle);
        }
        for objective in changes.objectives {
            self.objectives.insert(objective.id(), objective);
        }
        if let Some(user) = changes.users.into_iter().last() {
            self.user = Some(user);
        }
    }

    /// Checks the invariants a relational store would enforce.
    fn validate(&self) -> Result<(), DomainError> {
        for cycle in self.cycles.values() {
            if !self.pathways.contains_key(&cycle.pathway_id()) {
                return Err(integrity(format!(
                    "Cycle {} references missing pathway {}",
                    cycle.id(),
                    cycle.pathway_id()
                )));
            }
        }

        for objective in self.objectives.values() {
            if !self.pathways.contains_key(&objective.pathway_id()) {
                return Err(integrity(format!(
                    "Objective {} references missing pathway {}",
                    objective.id(),
                    objective.pathway_id()
                )));
            }
            if let Some(cycle_id) = objective.cycle_id() {
                match self.cycles.get(&cycle_id) {
                    Some(cycle) if cycle.pathway_id() == objective.pathway_id() => {}
                    _ => {
                        return Err(integrity(format!(
                            "Objective {} references unknown cycle {}",
                            objective.id(),
                            cycle_id
                        )))
                    }
                }
            }
        }

        let mut active_owners = HashSet::new();
        for cycle in self.cycles.values().filter(|c| c.is_active()) {
            if !active_owners.insert(cycle.pathway_id()) {
                return Err(integrity(format!(
                    "Pathway {} has more than one active cycle",
                    cycle.pathway_id()
                )));
            }
        }

        for pathway in self.pathways.values() {
            if let Some(cycle_id) = pathway.active_cycle_id() {
                let valid = self
                    .cycles
                    .get(&cycle_id)
                    .map_or(false, |c| c.is_active() && c.pathway_id() == pathway.id());
                if !valid {
                    return Err(integrity(format!(
                        "Pathway {} points at inactive or unknown cycle {}",
                        pathway.id(),
                        cycle_id
                    )));
                }
            }
        }

        Ok(())
    }
}

fn integrity(message: String) -> DomainError {
    DomainError::database(message)
}

fn poisoned<T>(_: PoisonError<T>) -> DomainError {
    DomainError::database("Store lock poisoned")
}

/// Process-local store backing all repositories and the unit of work.
#[derive(Debug, Default)]
pub struct InMemoryCadenceStore {
    state: RwLock<StoreState>,
    failing_scopes: RwLock<HashSet<PathwayId>>,
    commits: AtomicUsize,
}

impl InMemoryCadenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every commit scoped to `pathway_id` fail with `DatabaseError`.
    pub fn fail_commits_for(&self, pathway_id: PathwayId) {
        self.failing_scopes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pathway_id);
    }

    /// Lets commits for `pathway_id` succeed again.
    pub fn restore_commits_for(&self, pathway_id: &PathwayId) {
        self.failing_scopes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(pathway_id);
    }

    /// Number of successful commits so far.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Every objective of a pathway ordered by order ascending.
    pub fn objectives_of(&self, pathway_id: &PathwayId) -> Result<Vec<Objective>, DomainError> {
        let state = self.state.read().map_err(poisoned)?;
        let mut objectives: Vec<Objective> = state
            .objectives
            .values()
            .filter(|o| o.pathway_id() == *pathway_id)
            .cloned()
            .collect();
        objectives.sort_by_key(|o| (o.order(), o.id()));
        Ok(objectives)
    }
}

#[async_trait]
impl UnitOfWork for InMemoryCadenceStore {
    async fn commit(&self, changes: ChangeSet) -> Result<(), DomainError> {
        if let Some(scope) = changes.scope {
            let failing = self
                .failing_scopes
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains(&scope);
            if failing {
                return Err(DomainError::database(format!(
                    "Commit rejected for pathway {}",
                    scope
                ))
                .with_detail("pathway_id", scope.to_string()));
            }
        }

        let mut state = self.state.write().map_err(poisoned)?;
        let mut staged = state.clone();
        staged.apply(changes);
        staged.validate()?;
        *state = staged;
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl PathwayRepository for InMemoryCadenceStore {
    async fn find_by_id(&self, id: &PathwayId) -> Result<Option<Pathway>, DomainError> {
        Ok(self.state.read().map_err(poisoned)?.pathways.get(id).cloned())
    }

    async fn find_with_active_cycle(&self) -> Result<Vec<Pathway>, DomainError> {
        let state = self.state.read().map_err(poisoned)?;
        let mut pathways: Vec<Pathway> = state
            .pathways
            .values()
            .filter(|p| p.has_cadence())
            .cloned()
            .collect();
        pathways.sort_by_key(|p| (p.created_at(), p.id()));
        Ok(pathways)
    }
}

#[async_trait]
impl CycleRepository for InMemoryCadenceStore {
    async fn find_by_id(&self, id: &CycleId) -> Result<Option<CadenceCycle>, DomainError> {
        Ok(self.state.read().map_err(poisoned)?.cycles.get(id).cloned())
    }

    async fn find_by_pathway(
        &self,
        pathway_id: &PathwayId,
    ) -> Result<Vec<CadenceCycle>, DomainError> {
        let state = self.state.read().map_err(poisoned)?;
        let mut cycles: Vec<CadenceCycle> = state
            .cycles
            .values()
            .filter(|c| c.pathway_id() == *pathway_id)
            .cloned()
            .collect();
        cycles.sort_by(|a, b| {
            b.start_date()
                .cmp(&a.start_date())
                .then_with(|| b.is_active().cmp(&a.is_active()))
        });
        Ok(cycles)
    }
}

#[async_trait]
impl ObjectiveRepository for InMemoryCadenceStore {
    async fn find_by_id(&self, id: &ObjectiveId) -> Result<Option<Objective>, DomainError> {
        Ok(self.state.read().map_err(poisoned)?.objectives.get(id).cloned())
    }

    async fn find_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<Objective>, DomainError> {
        let state = self.state.read().map_err(poisoned)?;
        let mut objectives: Vec<Objective> = state
            .objectives
            .values()
            .filter(|o| o.is_assigned_to(*cycle_id))
            .cloned()
            .collect();
        objectives.sort_by_key(|o| (o.order(), o.id()));
        Ok(objectives)
    }

    async fn find_unassigned_incomplete(
        &self,
        pathway_id: &PathwayId,
        limit: u32,
    ) -> Result<Vec<Objective>, DomainError> {
        let state = self.state.read().map_err(poisoned)?;
        let mut objectives: Vec<Objective> = state
            .objectives
            .values()
            .filter(|o| o.pathway_id() == *pathway_id && o.is_available())
            .cloned()
            .collect();
        objectives.sort_by_key(|o| (o.order(), o.id()));
        objectives.truncate(limit as usize);
        Ok(objectives)
    }

    async fn max_order(&self, pathway_id: &PathwayId) -> Result<Option<i32>, DomainError> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .objectives
            .values()
            .filter(|o| o.pathway_id() == *pathway_id)
            .map(Objective::order)
            .max())
    }
}

#[async_trait]
impl UserRepository for InMemoryCadenceStore {
    async fn find_current(&self) -> Result<Option<User>, DomainError> {
        Ok(self.state.read().map_err(poisoned)?.user.clone())
    }
}
