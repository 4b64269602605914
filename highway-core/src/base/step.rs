//! Environment step.
use crate::record::Record;

/// Result of applying an action to an [`Env`](super::Env).
///
/// Together with the state the action was taken in, it forms a
/// [`Transition`](crate::replay_buffer::Transition).
#[derive(Debug, Clone)]
pub struct Step {
    /// Action applied to the environment.
    pub act: usize,

    /// Observation after the action.
    pub next_state: Vec<f32>,

    /// Reward.
    pub reward: f32,

    /// Flag denoting if the episode ended at this step.
    pub done: bool,

    /// Information defined by the environment.
    pub info: Record,
}

impl Step {
    /// Constructs a [`Step`] object.
    pub fn new(act: usize, next_state: Vec<f32>, reward: f32, done: bool, info: Record) -> Self {
        Self {
            act,
            next_state,
            reward,
            done,
            info,
        }
    }
}
