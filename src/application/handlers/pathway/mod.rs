//! Pathway command handlers.

mod create_pathway;

pub use create_pathway::{
    CreatePathwayCommand, CreatePathwayHandler, CreatePathwayResult, STARTER_OBJECTIVE_COUNT,
};
