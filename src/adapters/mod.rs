//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to the outside world:
//! - `allocation` - Objective generation policy
//! - `clock` - System and pinned clocks
//! - `events` - In-process event bus
//! - `memory` - In-memory store for every repository and the unit of work
//! - `scheduler` - Periodic cadence sweep

pub mod allocation;
pub mod clock;
pub mod events;
pub mod memory;
pub mod scheduler;

pub use allocation::RandomObjectiveGenerator;
pub use clock::{FixedClock, SystemClock};
pub use events::InMemoryEventBus;
pub use memory::InMemoryCadenceStore;
pub use scheduler::{PeriodicSweepConfig, PeriodicSweeper};
