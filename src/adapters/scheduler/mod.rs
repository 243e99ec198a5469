//! Scheduling adapters.
//!
//! - `PeriodicSweeper` - Runs the cadence sweep on a timer until shutdown

mod periodic_sweep;

pub use periodic_sweep::{PeriodicSweepConfig, PeriodicSweeper};
