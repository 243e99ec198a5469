//! Command infrastructure for application handlers.
//!
//! Every handler accepts a `CommandMetadata` so that emitted events carry the
//! same correlation ID and trigger source without threading loose strings
//! through each signature.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata context for command handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// Links every event emitted while handling one command.
    correlation_id: String,

    /// What started this command (e.g., "foreground", "timer", "user").
    trigger: String,
}

impl CommandMetadata {
    /// Creates metadata for the given trigger with a fresh correlation ID.
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            correlation_id: Uuid::new_v4().to_string(),
            trigger: trigger.into(),
        }
    }

    /// Metadata for an explicit user action.
    pub fn user() -> Self {
        Self::new("user")
    }

    /// Builder: override the correlation ID.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = id.into();
        self
    }

    /// Returns the correlation ID.
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Returns the trigger source.
    pub fn trigger(&self) -> &str {
        &self.trigger
    }
}
