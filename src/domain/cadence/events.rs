//! Cadence domain events.
//!
//! - `CyclesDidReset` - One or more pathways moved into a new window
//! - `CycleCompleted` - A window reached its target before expiry

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, CycleId, EventId, PathwayId, Timestamp};

// ════════════════════════════════════════════════════════════════════════════
// CyclesDidReset
// ════════════════════════════════════════════════════════════════════════════

/// Published once per sweep that advanced at least one pathway.
///
/// Batches every pathway that changed so subscribers refresh once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CyclesDidReset {
    /// Unique identifier for this event; also the aggregate id, since the
    /// event spans pathways.
    pub event_id: EventId,

    /// Pathways whose active cycle was replaced.
    pub pathway_ids: Vec<PathwayId>,

    /// When the sweep ran.
    pub reset_at: Timestamp,
}

domain_event!(
    CyclesDidReset,
    event_type = "cadence.cycles_reset.v1",
    schema_version = 1,
    aggregate_id = event_id,
    aggregate_type = "CadenceSweep",
    occurred_at = reset_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// CycleCompleted
// ════════════════════════════════════════════════════════════════════════════

/// Published when a window is credited toward the streak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleCompleted {
    pub event_id: EventId,

    pub cycle_id: CycleId,

    pub pathway_id: PathwayId,

    /// Streak after crediting this window.
    pub streak: u32,

    pub completed_at: Timestamp,
}

domain_event!(
    CycleCompleted,
    event_type = "cadence.cycle_completed.v1",
    schema_version = 1,
    aggregate_id = cycle_id,
    aggregate_type = "CadenceCycle",
    occurred_at = completed_at,
    event_id = event_id
);
