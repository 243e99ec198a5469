//! Pathway domain module.
//!
//! A pathway is a named progression track. It owns its objectives, the
//! full history of its cadence cycles, and a reference to the one cycle
//! that is currently active.
//!
//! # Events
//!
//! - `PathwayDidUpdate` - Published when a pathway or its cadence changes

mod aggregate;
mod events;

pub use aggregate::{Pathway, COLOR_COUNT, MAX_NAME_LENGTH};
pub use events::{PathwayDidUpdate, PathwayUpdateReason};
