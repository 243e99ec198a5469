//! Objective allocation adapters.
//!
//! - `RandomObjectiveGenerator` - Fresh objectives with random XP rewards

mod random_generator;

pub use random_generator::RandomObjectiveGenerator;
