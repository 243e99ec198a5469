//! UnitOfWork port - the save boundary.
//!
//! Every handler collects the aggregates it changed into one `ChangeSet`
//! per pathway and commits it in a single call. A failed commit leaves the
//! store exactly as it was before the call.

use async_trait::async_trait;

use crate::domain::cadence::CadenceCycle;
use crate::domain::foundation::{DomainError, PathwayId};
use crate::domain::objective::Objective;
use crate::domain::pathway::Pathway;
use crate::domain::user::User;

/// Aggregates to upsert atomically.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    /// Pathway the change belongs to, used for logging and failure scoping.
    pub scope: Option<PathwayId>,
    pub pathways: Vec<Pathway>,
    pub cycles: Vec<CadenceCycle>,
    pub objectives: Vec<Objective>,
    pub users: Vec<User>,
}

impl ChangeSet {
    /// Starts a change set scoped to one pathway.
    pub fn for_pathway(pathway_id: PathwayId) -> Self {
        Self {
            scope: Some(pathway_id),
            ..Self::default()
        }
    }

    pub fn with_pathway(mut self, pathway: Pathway) -> Self {
        self.pathways.push(pathway);
        self
    }

    pub fn with_cycle(mut self, cycle: CadenceCycle) -> Self {
        self.cycles.push(cycle);
        self
    }

    pub fn with_objectives(mut self, objectives: impl IntoIterator<Item = Objective>) -> Self {
        self.objectives.extend(objectives);
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pathways.is_empty()
            && self.cycles.is_empty()
            && self.objectives.is_empty()
            && self.users.is_empty()
    }
}

/// Port for committing a change set.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Upserts every aggregate in the change set, all or nothing.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure; nothing is written
    async fn commit(&self, changes: ChangeSet) -> Result<(), DomainError>;
}
