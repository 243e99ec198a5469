//! Pathway domain events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, EventId, PathwayId, Timestamp};

/// Why a pathway changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathwayUpdateReason {
    Created,
    CadenceEnabled,
    CadenceReconfigured,
    CadenceDisabled,
    ObjectiveCompleted,
}

/// Published whenever a pathway or its cadence state changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathwayDidUpdate {
    /// Unique identifier for this event.
    pub event_id: EventId,

    /// ID of the updated pathway.
    pub pathway_id: PathwayId,

    pub reason: PathwayUpdateReason,

    /// When the update occurred.
    pub updated_at: Timestamp,
}

domain_event!(
    PathwayDidUpdate,
    event_type = "pathway.updated.v1",
    schema_version = 1,
    aggregate_id = pathway_id,
    aggregate_type = "Pathway",
    occurred_at = updated_at,
    event_id = event_id
);

impl PathwayDidUpdate {
    pub fn new(pathway_id: PathwayId, reason: PathwayUpdateReason, updated_at: Timestamp) -> Self {
        Self {
            event_id: EventId::new(),
            pathway_id,
            reason,
            updated_at,
        }
    }
}
