//! Batch of transitions.
use super::Transition;

/// Handle of a sampled transition.
///
/// `generation` counts the writes to `slot` at the time of sampling, so a
/// handle whose slot has been overwritten since then is detected as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SampleIndex {
    /// Slot in the ring.
    pub slot: usize,

    /// Number of writes to the slot when it was sampled.
    pub generation: u64,
}

/// A batch of transitions sampled from a replay buffer.
#[derive(Debug, Clone)]
pub struct TransitionBatch {
    /// Sampled transitions.
    pub transitions: Vec<Transition>,

    /// Handles of the sampled transitions, used to update priorities.
    ///
    /// `None` for buffers without priorities.
    pub ix_sample: Option<Vec<SampleIndex>>,

    /// Importance sampling weights, normalized to at most 1.
    ///
    /// `None` for buffers without priorities.
    pub weight: Option<Vec<f32>>,
}

impl TransitionBatch {
    /// The number of transitions in the batch.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Returns `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Mean of the importance sampling weights, if any.
    pub fn mean_weight(&self) -> Option<f32> {
        match &self.weight {
            Some(ws) if !ws.is_empty() => Some(ws.iter().sum::<f32>() / ws.len() as f32),
            _ => None,
        }
    }
}
