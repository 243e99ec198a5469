//! Cadence domain module.
//!
//! Recurring, calendar-aligned windows that ask a pathway for a target
//! number of completed objectives.
//!
//! # Components
//!
//! - `TimeframeCalculator` - Pure window boundary math
//! - `CadenceCycle` - One window: dates, target, streak, advance logic
//! - `CyclePhase` - Lifecycle state machine of a window
//! - `CadenceSettings` - Validated frequency and target count
//! - `StreakAudit` - Diagnostics for streak/completion inconsistencies
//!
//! # Events
//!
//! - `CyclesDidReset` - Published once per sweep that changed something
//! - `CycleCompleted` - Published when a window is credited

mod audit;
mod cycle;
mod events;
mod phase;
mod reconfigure;
mod settings;
mod timeframe;

pub use audit::{StreakAnomaly, StreakAudit};
pub use cycle::{AllocationContext, CadenceCycle, WindowFill};
pub use events::{CycleCompleted, CyclesDidReset};
pub use phase::CyclePhase;
pub use reconfigure::{Reconfiguration, StreakChange};
pub use settings::{CadenceSettings, MAX_REQUIRED_COUNT};
pub use timeframe::{CalendarZone, TimeframeCalculator};
