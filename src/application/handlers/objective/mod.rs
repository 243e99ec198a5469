//! Objective command handlers.

mod complete_objective;

pub use complete_objective::{
    CompleteObjectiveCommand, CompleteObjectiveHandler, CompleteObjectiveResult,
};
