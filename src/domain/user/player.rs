//! User aggregate - the local player.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;
use crate::domain::progression::{LevelChange, Progression};

/// The local player and their global progression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    objectives_completed: u32,
    progression: Progression,
}

impl User {
    pub fn new() -> Self {
        Self {
            id: UserId::new(),
            objectives_completed: 0,
            progression: Progression::new(),
        }
    }

    pub fn reconstitute(id: UserId, objectives_completed: u32, progression: Progression) -> Self {
        Self {
            id,
            objectives_completed,
            progression,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn objectives_completed(&self) -> u32 {
        self.objectives_completed
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    /// Counts a completed objective and awards its XP globally.
    pub fn record_completion(&mut self, xp: u32) -> Option<LevelChange> {
        self.objectives_completed += 1;
        self.progression.award(xp)
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new()
    }
}
