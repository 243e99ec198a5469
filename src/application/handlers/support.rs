//! Plumbing shared by the cadence, objective and pathway handlers.

use tracing::{error, warn};

use crate::domain::cadence::WindowFill;
use crate::domain::foundation::{
    CommandMetadata, CycleId, DomainError, EventEnvelope, PathwayId, SerializableDomainEvent,
};
use crate::domain::objective::Objective;
use crate::ports::{EventPublisher, ObjectiveRepository};

/// Loads the objectives a pathway's cadence logic works on: everything
/// assigned to `cycle_id` plus up to `pool_limit` unassigned incomplete
/// objectives.
pub(crate) async fn load_working_set(
    objectives: &dyn ObjectiveRepository,
    pathway_id: PathwayId,
    cycle_id: Option<CycleId>,
    pool_limit: u32,
) -> Result<Vec<Objective>, DomainError> {
    let mut working_set = match cycle_id {
        Some(id) => objectives.find_by_cycle(&id).await?,
        None => Vec::new(),
    };
    working_set.extend(
        objectives
            .find_unassigned_incomplete(&pathway_id, pool_limit)
            .await?,
    );
    Ok(working_set)
}

/// Order for the next objective created in a pathway.
pub(crate) async fn next_order(
    objectives: &dyn ObjectiveRepository,
    pathway_id: PathwayId,
) -> Result<i32, DomainError> {
    Ok(objectives
        .max_order(&pathway_id)
        .await?
        .map_or(1, |max| max.saturating_add(1)))
}

/// Wraps an event for publication, tagging it with the command's
/// correlation id and trigger.
///
/// Returns `None` (and logs) if the event cannot be serialised.
pub(crate) fn envelope<E: SerializableDomainEvent>(
    event: &E,
    metadata: &CommandMetadata,
) -> Option<EventEnvelope> {
    match event.to_envelope() {
        Ok(envelope) => Some(
            envelope
                .with_correlation_id(metadata.correlation_id())
                .with_trigger(metadata.trigger()),
        ),
        Err(err) => {
            error!(error = %err, "Failed to serialise event");
            None
        }
    }
}

/// Publishes after a successful commit. Failures are logged only.
pub(crate) async fn publish_quietly(publisher: &dyn EventPublisher, envelopes: Vec<EventEnvelope>) {
    if envelopes.is_empty() {
        return;
    }
    let count = envelopes.len();
    if let Err(err) = publisher.publish_all(envelopes).await {
        warn!(error = %err, count, "Event publication failed");
    }
}

/// Logs a window that could not be fully staffed.
pub(crate) fn report_fill(pathway_id: PathwayId, fill: &WindowFill) {
    if let Some(err) = &fill.generation_error {
        warn!(
            pathway_id = %pathway_id,
            error = %err,
            "Objective generation failed"
        );
    }
    if fill.is_short() {
        warn!(
            pathway_id = %pathway_id,
            shortfall = fill.shortfall,
            "Window has fewer objectives than required"
        );
    }
}
