//! Replay buffer with uniform sampling.
use super::{ring::Ring, ReplayBufferConfig, SampleIndex, Transition, TransitionBatch};
use crate::{
    base::{ExperienceBufferBase, ReplayBufferBase},
    error::HighwayError,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A replay buffer sampling transitions uniformly at random with replacement.
pub struct ReplayBuffer {
    config: ReplayBufferConfig,
    ring: Ring<Transition>,
    rng: StdRng,
}

impl ReplayBuffer {
    /// Samples `batch_size` transitions uniformly with replacement.
    ///
    /// The returned batch has neither sample handles nor weights.
    pub fn sample(&mut self, batch_size: usize) -> Result<TransitionBatch, HighwayError> {
        let len = self.ring.len();
        if len < batch_size {
            return Err(HighwayError::InsufficientData {
                requested: batch_size,
                available: len,
            });
        }

        let transitions = (0..batch_size)
            .filter_map(|_| self.ring.get(self.rng.gen_range(0..len)).cloned())
            .collect();

        Ok(TransitionBatch {
            transitions,
            ix_sample: None,
            weight: None,
        })
    }

    /// Iterates over stored transitions from the oldest to the newest.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.ring.iter()
    }

    /// Maximum number of transitions.
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Returns `true` once `capacity` transitions have been pushed.
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Configuration of the buffer.
    pub fn config(&self) -> &ReplayBufferConfig {
        &self.config
    }
}

impl ExperienceBufferBase for ReplayBuffer {
    type Item = Transition;

    fn push(&mut self, tr: Transition) -> Result<(), HighwayError> {
        tr.validate(self.config.state_dim, self.config.n_actions)?;
        self.ring.push(tr);
        Ok(())
    }

    fn len(&self) -> usize {
        self.ring.len()
    }
}

impl ReplayBufferBase for ReplayBuffer {
    type Config = ReplayBufferConfig;
    type Batch = TransitionBatch;

    fn build(config: &Self::Config) -> Result<Self, HighwayError> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            ring: Ring::new(config.capacity),
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch, HighwayError> {
        self.sample(size)
    }

    fn update_priority(
        &mut self,
        _ixs: &[SampleIndex],
        _td_errs: &[f32],
    ) -> Result<(), HighwayError> {
        Ok(())
    }
}
