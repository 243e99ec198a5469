//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

mod app_state;
pub mod handlers;

pub use app_state::CadenceAppState;
pub use handlers::{
    // Cadence handlers
    AdvancedPathway, CadenceStatus, DisableCadenceCommand, DisableCadenceHandler,
    DisableCadenceResult, EnableCadenceCommand, EnableCadenceHandler, EnableCadenceResult,
    GetCadenceStatusHandler, GetCadenceStatusQuery, ReconfigureCadenceCommand,
    ReconfigureCadenceHandler, ReconfigureCadenceResult, ReconfigureOutcome, SweepCyclesCommand,
    SweepCyclesHandler, SweepFailure, SweepReport,
    // Objective handlers
    CompleteObjectiveCommand, CompleteObjectiveHandler, CompleteObjectiveResult,
    // Pathway handlers
    CreatePathwayCommand, CreatePathwayHandler, CreatePathwayResult, STARTER_OBJECTIVE_COUNT,
};
