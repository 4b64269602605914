//! Annealing the exponent of importance sampling weights.
use serde::{Deserialize, Serialize};

/// Linear schedule of the exponent `beta` of importance sampling weights.
///
/// `beta` moves from `beta_start` to `beta_end` over `anneal_steps` priority
/// updates and stays at `beta_end` afterwards.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct IwScheduler {
    /// Initial value of `beta`.
    pub beta_start: f32,

    /// Final value of `beta`.
    pub beta_end: f32,

    /// Number of updates when `beta` reaches `beta_end`.
    pub anneal_steps: usize,

    /// Number of updates so far.
    pub n_updates: usize,
}

impl IwScheduler {
    /// Creates a scheduler.
    pub fn new(beta_start: f32, beta_end: f32, anneal_steps: usize) -> Self {
        Self {
            beta_start,
            beta_end,
            anneal_steps,
            n_updates: 0,
        }
    }

    /// Current value of `beta`.
    pub fn beta(&self) -> f32 {
        if self.n_updates >= self.anneal_steps {
            self.beta_end
        } else {
            let frac = self.n_updates as f32 / self.anneal_steps as f32;
            self.beta_start + (self.beta_end - self.beta_start) * frac
        }
    }

    /// Advances the schedule by one priority update.
    pub fn step(&mut self) {
        self.n_updates = self.n_updates.saturating_add(1);
    }
}
