//! Pathway repository port (read side of the store).
//!
//! Writes go through `UnitOfWork` so a pathway, its cycles and objectives
//! are saved together.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PathwayId};
use crate::domain::pathway::Pathway;

/// Repository port for Pathway lookup.
#[async_trait]
pub trait PathwayRepository: Send + Sync {
    /// Find a pathway by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &PathwayId) -> Result<Option<Pathway>, DomainError>;

    /// Find every pathway that currently references an active cycle.
    ///
    /// Returns pathways ordered by created_at ascending.
    async fn find_with_active_cycle(&self) -> Result<Vec<Pathway>, DomainError>;
}
