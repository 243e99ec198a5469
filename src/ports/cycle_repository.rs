//! Cadence cycle repository port (read side of the store).

use async_trait::async_trait;

use crate::domain::cadence::CadenceCycle;
use crate::domain::foundation::{CycleId, DomainError, PathwayId};

/// Repository port for CadenceCycle lookup.
///
/// Cycles are never deleted; inactive cycles stay queryable as history.
#[async_trait]
pub trait CycleRepository: Send + Sync {
    /// Find a cycle by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &CycleId) -> Result<Option<CadenceCycle>, DomainError>;

    /// Find all cycles of a pathway, active and historical.
    ///
    /// Returns cycles ordered by start_date descending.
    async fn find_by_pathway(&self, pathway_id: &PathwayId)
        -> Result<Vec<CadenceCycle>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn CycleRepository) {}
    }
}
