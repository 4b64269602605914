//! Action-value function.
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Critic loss type.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum CriticLoss {
    /// Mean squared error.
    Mse,

    /// Smooth L1 (Huber) loss with threshold 1.
    SmoothL1,
}

/// Inputs of a single parameter update of a [`QNetwork`].
///
/// All slices have the batch size as their length.
#[derive(Debug, Clone, Copy)]
pub struct FitBatch<'a> {
    /// States `s_i`.
    pub states: &'a [&'a [f32]],

    /// Actions `a_i` whose values are regressed.
    pub actions: &'a [usize],

    /// Regression targets `y_i`.
    pub targets: &'a [f32],

    /// Importance sampling weights, multiplied to the per-sample losses.
    pub weights: Option<&'a [f32]>,

    /// Loss applied to `Q(s_i, a_i) - y_i`.
    pub loss: CriticLoss,
}

/// A parametric function mapping a state to the values of all actions.
///
/// The agent keeps two instances, the online network and the target network.
/// They never share parameters; the target is updated only through
/// [`QNetwork::set_parameters`].
pub trait QNetwork {
    /// Snapshot of the parameters.
    type Params: Clone;

    /// The number of actions, i.e., the length of each output row.
    fn n_actions(&self) -> usize;

    /// Returns action values for each state in the batch.
    fn predict(&self, states: &[&[f32]]) -> Result<Vec<Vec<f32>>>;

    /// Applies one optimizer step on the given batch and returns the loss
    /// before the update.
    fn fit_batch(&mut self, batch: FitBatch<'_>) -> Result<f32>;

    /// Returns a copy of the parameters.
    fn get_parameters(&self) -> Self::Params;

    /// Overwrites the parameters.
    fn set_parameters(&mut self, params: Self::Params) -> Result<()>;
}

/// Index of the largest value, the first one on ties.
///
/// Returns `None` for an empty slice. NaN entries are never selected
/// unless all entries are NaN.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            None => best = Some((i, v)),
            Some((_, b)) if v > b || (b.is_nan() && !v.is_nan()) => best = Some((i, v)),
            _ => {}
        }
    }
    best.map(|(i, _)| i)
}
