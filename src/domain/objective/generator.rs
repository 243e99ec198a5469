//! Allocation policy for creating objectives a window cannot source from
//! the existing pool.

use crate::domain::foundation::{CycleId, DomainError, PathwayId, Timestamp};

use super::Objective;

/// Parameters for generating fresh objectives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub pathway_id: PathwayId,
    pub count: u32,
    /// Order assigned to the first generated objective; the rest follow
    /// sequentially.
    pub first_order: i32,
    /// Cycle the generated objectives join, if any.
    pub assign_to: Option<CycleId>,
    pub created_at: Timestamp,
}

/// Domain service that produces new objectives.
///
/// Implementations must return objectives for `request.pathway_id`, in
/// ascending order starting at `first_order`, already assigned to
/// `assign_to`. Returning fewer than `count` is allowed; the caller reports
/// the shortfall.
pub trait ObjectiveGenerator: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> Result<Vec<Objective>, DomainError>;
}
