//! User domain module.
//!
//! The single local player. Holds global XP progression across all
//! pathways and a running count of completed objectives.

mod player;

pub use player::User;
