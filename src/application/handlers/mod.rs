//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations. Each
//! command handler loads what it needs through the repository ports,
//! mutates the aggregates, commits one change set per pathway, and then
//! publishes its events.

pub mod cadence;
pub mod objective;
pub mod pathway;

mod support;
#[cfg(test)]
pub(crate) mod test_support;

pub use cadence::{
    AdvancedPathway, CadenceStatus, DisableCadenceCommand, DisableCadenceHandler,
    DisableCadenceResult, EnableCadenceCommand, EnableCadenceHandler, EnableCadenceResult,
    GetCadenceStatusHandler, GetCadenceStatusQuery, ReconfigureCadenceCommand,
    ReconfigureCadenceHandler, ReconfigureCadenceResult, ReconfigureOutcome, SweepCyclesCommand,
    SweepCyclesHandler, SweepFailure, SweepReport,
};
pub use objective::{CompleteObjectiveCommand, CompleteObjectiveHandler, CompleteObjectiveResult};
pub use pathway::{
    CreatePathwayCommand, CreatePathwayHandler, CreatePathwayResult, STARTER_OBJECTIVE_COUNT,
};
