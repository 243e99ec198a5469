//! XP progression shared by pathways and the player.

use serde::{Deserialize, Serialize};

/// XP needed to leave level 1.
pub const BASE_REQUIRED_XP: u32 = 1000;

/// Growth of the requirement per level gained.
pub const REQUIRED_XP_STEP: u32 = 500;

/// Level, XP into the current level, and XP needed for the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    level: u32,
    xp: u32,
    required_xp: u32,
}

/// Levels crossed by a single award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelChange {
    pub from: u32,
    pub to: u32,
}

impl Progression {
    pub fn new() -> Self {
        Self {
            level: 1,
            xp: 0,
            required_xp: BASE_REQUIRED_XP,
        }
    }

    pub fn reconstitute(level: u32, xp: u32, required_xp: u32) -> Self {
        Self {
            level,
            xp,
            required_xp,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn xp(&self) -> u32 {
        self.xp
    }

    pub fn required_xp(&self) -> u32 {
        self.required_xp
    }

    /// Adds XP, levelling up as many times as the total allows.
    ///
    /// The remainder carries into the new level and each level raises the
    /// requirement by `REQUIRED_XP_STEP`.
    pub fn award(&mut self, amount: u32) -> Option<LevelChange> {
        let from = self.level;
        self.xp = self.xp.saturating_add(amount);
        while self.required_xp > 0 && self.xp >= self.required_xp {
            self.xp -= self.required_xp;
            self.level += 1;
            self.required_xp = self.required_xp.saturating_add(REQUIRED_XP_STEP);
        }
        (self.level != from).then_some(LevelChange {
            from,
            to: self.level,
        })
    }
}

impl Default for Progression {
    fn default() -> Self {
        Self::new()
    }
}
