//! Cadence command and query handlers.

// Command handlers
mod disable_cadence;
mod enable_cadence;
mod reconfigure_cadence;
mod sweep_cycles;

// Query handlers
mod get_cadence_status;

pub use disable_cadence::{DisableCadenceCommand, DisableCadenceHandler, DisableCadenceResult};
pub use enable_cadence::{EnableCadenceCommand, EnableCadenceHandler, EnableCadenceResult};
pub use get_cadence_status::{CadenceStatus, GetCadenceStatusHandler, GetCadenceStatusQuery};
pub use reconfigure_cadence::{
    ReconfigureCadenceCommand, ReconfigureCadenceHandler, ReconfigureCadenceResult,
    ReconfigureOutcome,
};
pub use sweep_cycles::{
    AdvancedPathway, SweepCyclesCommand, SweepCyclesHandler, SweepFailure, SweepReport,
};
