//! Replay buffer interfaces.
//!
//! [`ExperienceBufferBase`] is the write side used when interacting with an
//! environment; [`ReplayBufferBase`] is the read side used by the learner.
use crate::{error::HighwayError, replay_buffer::SampleIndex};

/// Interface for buffers that store experiences from environments.
pub trait ExperienceBufferBase {
    /// The type of items stored in the buffer.
    type Item;

    /// Pushes a new experience into the buffer.
    ///
    /// A full buffer overwrites its oldest item; this is not an error.
    fn push(&mut self, tr: Self::Item) -> Result<(), HighwayError>;

    /// Returns the current number of experiences in the buffer.
    fn len(&self) -> usize;

    /// Returns `true` if the buffer holds no experience.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Interface for replay buffers that generate batches for training.
pub trait ReplayBufferBase {
    /// Configuration parameters for the replay buffer.
    type Config: Clone;

    /// The type of batch generated for training.
    type Batch;

    /// Builds a new replay buffer from the given configuration.
    fn build(config: &Self::Config) -> Result<Self, HighwayError>
    where
        Self: Sized;

    /// Samples a batch of `size` experiences.
    ///
    /// Fails with [`HighwayError::InsufficientData`] if fewer than `size`
    /// experiences are stored.
    fn batch(&mut self, size: usize) -> Result<Self::Batch, HighwayError>;

    /// Updates priorities of sampled experiences from their TD errors.
    ///
    /// Buffers without priorities ignore the call.
    fn update_priority(&mut self, ixs: &[SampleIndex], td_errs: &[f32])
        -> Result<(), HighwayError>;
}
