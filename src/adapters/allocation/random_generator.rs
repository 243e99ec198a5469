//! Generates objectives with random XP rewards.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::objective::{GenerationRequest, Objective, ObjectiveGenerator, XpValue};

/// Creates objectives worth a random multiple of 10 XP in `[100, 500]`.
///
/// Orders continue sequentially from `first_order`.
pub struct RandomObjectiveGenerator {
    rng: Mutex<StdRng>,
}

impl RandomObjectiveGenerator {
    /// Generator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic generator for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomObjectiveGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectiveGenerator for RandomObjectiveGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<Vec<Objective>, DomainError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| DomainError::new(ErrorCode::GenerationFailed, "Generator lock poisoned"))?;

        let low = XpValue::MIN / XpValue::STEP;
        let high = XpValue::MAX / XpValue::STEP;

        let mut objectives = Vec::with_capacity(request.count as usize);
        for offset in 0..request.count {
            let order = i32::try_from(offset)
                .ok()
                .and_then(|offset| request.first_order.checked_add(offset))
                .ok_or_else(|| {
                    DomainError::new(ErrorCode::GenerationFailed, "Objective order overflow")
                })?;
            let xp = XpValue::new(rng.gen_range(low..=high) * XpValue::STEP)?;

            let mut objective = Objective::new(request.pathway_id, xp, order, request.created_at);
            if let Some(cycle_id) = request.assign_to {
                objective.assign_to(cycle_id)?;
            }
            objectives.push(objective);
        }

        Ok(objectives)
    }
}
