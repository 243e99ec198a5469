//! Objective repository port - the objective pool.
//!
//! Exposes the predicate-style fetches the cadence logic needs to pick
//! objectives for a window.

use async_trait::async_trait;

use crate::domain::foundation::{CycleId, DomainError, ObjectiveId, PathwayId};
use crate::domain::objective::Objective;

/// Repository port for Objective lookup.
#[async_trait]
pub trait ObjectiveRepository: Send + Sync {
    /// Find an objective by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &ObjectiveId) -> Result<Option<Objective>, DomainError>;

    /// Find every objective assigned to a cycle, completed or not.
    ///
    /// Returns objectives ordered by order ascending.
    async fn find_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<Objective>, DomainError>;

    /// Find incomplete objectives of a pathway not assigned to any cycle.
    ///
    /// Returns at most `limit` objectives ordered by order ascending.
    async fn find_unassigned_incomplete(
        &self,
        pathway_id: &PathwayId,
        limit: u32,
    ) -> Result<Vec<Objective>, DomainError>;

    /// Highest `order` used in a pathway, or `None` if it has no objectives.
    async fn max_order(&self, pathway_id: &PathwayId) -> Result<Option<i32>, DomainError>;
}
