//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `cadence` - Recurring windows, streaks, and window boundary math
//! - `objective` - Objectives, XP values, and the generation policy
//! - `pathway` - Pathway aggregate and its events
//! - `user` - The local player
//! - `progression` - Level and XP bookkeeping shared by pathways and the player

pub mod cadence;
pub mod foundation;
pub mod objective;
pub mod pathway;
pub mod progression;
pub mod user;
