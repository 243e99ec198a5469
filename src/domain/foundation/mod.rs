//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the cadence domain.

mod command;
mod errors;
mod events;
mod frequency;
mod ids;
mod state_machine;
mod timestamp;

pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{
    domain_event, DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent,
};
pub use frequency::Frequency;
pub use ids::{CycleId, ObjectiveId, PathwayId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
