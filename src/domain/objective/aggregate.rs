//! Objective entity - one assignable unit of work worth XP.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CycleId, DomainError, ErrorCode, ObjectiveId, PathwayId, Timestamp,
};

use super::XpValue;

/// An atomic task inside a pathway.
///
/// An objective references the cycle it is assigned to by id only. A
/// rollover clears the assignment of every objective in the ended window,
/// completed or not; only disabling a cadence leaves completed objectives
/// attached. A completed objective is never assigned again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    id: ObjectiveId,
    pathway_id: PathwayId,
    xp: XpValue,
    is_completed: bool,
    order: i32,
    cycle_id: Option<CycleId>,
    created_at: Timestamp,
    completed_at: Option<Timestamp>,
}

impl Objective {
    /// Creates a new, unassigned, incomplete objective.
    pub fn new(pathway_id: PathwayId, xp: XpValue, order: i32, created_at: Timestamp) -> Self {
        Self {
            id: ObjectiveId::new(),
            pathway_id,
            xp,
            is_completed: false,
            order,
            cycle_id: None,
            created_at,
            completed_at: None,
        }
    }

    /// Reconstitutes an objective from persisted data.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ObjectiveId,
        pathway_id: PathwayId,
        xp: XpValue,
        is_completed: bool,
        order: i32,
        cycle_id: Option<CycleId>,
        created_at: Timestamp,
        completed_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            pathway_id,
            xp,
            is_completed,
            order,
            cycle_id,
            created_at,
            completed_at,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> ObjectiveId {
        self.id
    }

    pub fn pathway_id(&self) -> PathwayId {
        self.pathway_id
    }

    pub fn xp(&self) -> XpValue {
        self.xp
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Stable sequencing position within the pathway.
    pub fn order(&self) -> i32 {
        self.order
    }

    /// Cycle this objective is assigned to, if any.
    pub fn cycle_id(&self) -> Option<CycleId> {
        self.cycle_id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<Timestamp> {
        self.completed_at
    }

    /// True when assigned to the given cycle.
    pub fn is_assigned_to(&self, cycle_id: CycleId) -> bool {
        self.cycle_id == Some(cycle_id)
    }

    /// True when the objective can be picked up by a new window.
    pub fn is_available(&self) -> bool {
        !self.is_completed && self.cycle_id.is_none()
    }

    // ───────────────────────────────────────────────────────────────
    // Behavior
    // ───────────────────────────────────────────────────────────────

    /// Marks the objective completed.
    ///
    /// # Errors
    ///
    /// - `ObjectiveAlreadyCompleted` if it was completed before
    pub fn complete(&mut self, now: Timestamp) -> Result<(), DomainError> {
        if self.is_completed {
            return Err(DomainError::new(
                ErrorCode::ObjectiveAlreadyCompleted,
                format!("Objective {} is already completed", self.id),
            ));
        }
        self.is_completed = true;
        self.completed_at = Some(now);
        Ok(())
    }

    /// Assigns the objective to a cycle.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the objective is completed and belongs
    ///   to a different cycle
    pub fn assign_to(&mut self, cycle_id: CycleId) -> Result<(), DomainError> {
        if self.is_completed && self.cycle_id != Some(cycle_id) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Completed objective {} cannot join cycle {}", self.id, cycle_id),
            ));
        }
        self.cycle_id = Some(cycle_id);
        Ok(())
    }

    /// Clears the cycle reference. The objective itself is kept.
    pub fn detach(&mut self) {
        self.cycle_id = None;
    }
}
