//! Objective domain module.
//!
//! Objectives are the atomic units of work in a pathway. Each carries a
//! fixed XP reward and an optional reference to the cadence cycle it is
//! currently assigned to.

mod aggregate;
mod generator;
mod xp;

pub use aggregate::Objective;
pub use generator::{GenerationRequest, ObjectiveGenerator};
pub use xp::XpValue;
