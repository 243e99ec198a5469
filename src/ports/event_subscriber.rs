//! EventSubscriber port - Interface for subscribing to domain events.
//!
//! The presentation layer registers handlers here to refresh itself when
//! cycles reset, windows complete, or pathways change.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Handler for processing domain events.
///
/// # Example
///
/// ```ignore
/// struct StreakBadge { /* ... */ }
///
/// #[async_trait]
/// impl EventHandler for StreakBadge {
///     async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
///         let payload: CycleCompleted = event.payload_as()?;
///         // Refresh the badge...
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "StreakBadge"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process an event.
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to domain events.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe handler to a specific event type.
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    /// Subscribe handler to multiple event types.
    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>);
}

/// Combined trait for event bus implementations.
pub trait EventBus: super::EventPublisher + EventSubscriber {}

impl<T: super::EventPublisher + EventSubscriber> EventBus for T {}
