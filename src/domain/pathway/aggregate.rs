//! Pathway aggregate - a named progression track.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CycleId, PathwayId, Timestamp, ValidationError};
use crate::domain::progression::{LevelChange, Progression};

/// Number of selectable pathway colours.
pub const COLOR_COUNT: u8 = 8;

/// Maximum pathway name length in characters.
pub const MAX_NAME_LENGTH: usize = 60;

/// A progression track that owns objectives and at most one active cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pathway {
    id: PathwayId,
    name: String,
    description: Option<String>,
    color_index: u8,
    emoji: Option<String>,
    objectives_completed: u32,
    progression: Progression,
    active_cycle_id: Option<CycleId>,
    created_at: Timestamp,
}

impl Pathway {
    /// Creates a new pathway.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the name is blank
    /// - `InvalidFormat` if the name is too long
    /// - `OutOfRange` if the colour index is not below `COLOR_COUNT`
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        color_index: u8,
        emoji: Option<String>,
        created_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(ValidationError::invalid_format(
                "name",
                format!("must be at most {} characters", MAX_NAME_LENGTH),
            ));
        }
        if color_index >= COLOR_COUNT {
            return Err(ValidationError::out_of_range(
                "color_index",
                0,
                i64::from(COLOR_COUNT - 1),
                i64::from(color_index),
            ));
        }

        Ok(Self {
            id: PathwayId::new(),
            name,
            description: description.filter(|d| !d.trim().is_empty()),
            color_index,
            emoji: emoji.filter(|e| !e.trim().is_empty()),
            objectives_completed: 0,
            progression: Progression::new(),
            active_cycle_id: None,
            created_at,
        })
    }

    /// Reconstitutes a pathway from persisted data.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: PathwayId,
        name: String,
        description: Option<String>,
        color_index: u8,
        emoji: Option<String>,
        objectives_completed: u32,
        progression: Progression,
        active_cycle_id: Option<CycleId>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            description,
            color_index,
            emoji,
            objectives_completed,
            progression,
            active_cycle_id,
            created_at,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> PathwayId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn color_index(&self) -> u8 {
        self.color_index
    }

    pub fn emoji(&self) -> Option<&str> {
        self.emoji.as_deref()
    }

    pub fn objectives_completed(&self) -> u32 {
        self.objectives_completed
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn active_cycle_id(&self) -> Option<CycleId> {
        self.active_cycle_id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn has_cadence(&self) -> bool {
        self.active_cycle_id.is_some()
    }

    // ───────────────────────────────────────────────────────────────
    // Behavior
    // ───────────────────────────────────────────────────────────────

    /// Points the pathway at a new active cycle.
    pub fn activate_cycle(&mut self, cycle_id: CycleId) {
        self.active_cycle_id = Some(cycle_id);
    }

    /// Drops the active cycle reference when the cadence is disabled.
    pub fn clear_active_cycle(&mut self) {
        self.active_cycle_id = None;
    }

    /// Counts a completed objective and awards its XP.
    pub fn record_completion(&mut self, xp: u32) -> Option<LevelChange> {
        self.objectives_completed += 1;
        self.progression.award(xp)
    }
}
