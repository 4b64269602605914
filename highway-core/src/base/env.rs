//! Environment.
use super::Step;
use anyhow::Result;

/// Represents an environment with a finite set of actions.
///
/// States are fixed-length feature vectors; actions are indices in
/// `0..n_actions()`.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Starts a new episode and returns the initial state.
    fn reset(&mut self) -> Result<Vec<f32>>;

    /// Performs an environment step.
    fn step(&mut self, act: usize) -> Result<Step>;

    /// The number of actions.
    fn n_actions(&self) -> usize;
}
