//! Prioritized experience replay.
mod iw_scheduler;
mod sum_tree;
use super::{
    ring::Ring, PrioritizedReplayBufferConfig, SampleIndex, Transition, TransitionBatch,
};
use crate::{
    base::{ExperienceBufferBase, ReplayBufferBase},
    error::HighwayError,
};
pub use iw_scheduler::IwScheduler;
use rand::{rngs::StdRng, SeedableRng};
use sum_tree::SumTree;
pub use sum_tree::WeightNormalizer;

/// A replay buffer sampling transitions proportionally to their priorities.
///
/// Transitions pushed without a priority get the maximum priority in the
/// buffer, or 1.0 if the buffer is empty, so they are likely sampled before
/// their TD error is known. Stored priorities are never below
/// [`PerConfig::priority_epsilon_floor`](super::PerConfig::priority_epsilon_floor).
///
/// Sampling returns [`SampleIndex`] handles. Passing a handle whose slot has
/// been overwritten since sampling to [`update_priorities`] fails with
/// [`HighwayError::StaleIndex`] and leaves all priorities unchanged.
///
/// [`update_priorities`]: PrioritizedReplayBuffer::update_priorities
pub struct PrioritizedReplayBuffer {
    config: PrioritizedReplayBufferConfig,
    ring: Ring<Transition>,
    sum_tree: SumTree,
    iw_scheduler: IwScheduler,
    rng: StdRng,
}

impl PrioritizedReplayBuffer {
    fn floor(&self) -> f32 {
        self.config.per.priority_epsilon_floor
    }

    fn check_priority(p: f32) -> Result<(), HighwayError> {
        if p.is_finite() && p >= 0.0 {
            Ok(())
        } else {
            Err(HighwayError::Validation(format!(
                "priority must be finite and non-negative, got {}",
                p
            )))
        }
    }

    /// Pushes a transition with the given priority.
    ///
    /// The priority is raised to the configured floor if smaller.
    pub fn push_with_priority(&mut self, tr: Transition, priority: f32) -> Result<(), HighwayError> {
        let buf = &self.config.buffer;
        tr.validate(buf.state_dim, buf.n_actions)?;
        Self::check_priority(priority)?;
        let p = priority.max(self.floor());
        let slot = self.ring.push(tr);
        self.sum_tree.set(slot, p);
        Ok(())
    }

    /// The maximum priority in the buffer, 1.0 if empty.
    pub fn max_priority(&self) -> f32 {
        self.sum_tree.max().unwrap_or(1.0)
    }

    /// Samples `batch_size` transitions with stratified proportional sampling.
    ///
    /// The batch carries sample handles and importance sampling weights in
    /// `(0, 1]`.
    pub fn sample(&mut self, batch_size: usize) -> Result<TransitionBatch, HighwayError> {
        let len = self.ring.len();
        if len < batch_size {
            return Err(HighwayError::InsufficientData {
                requested: batch_size,
                available: len,
            });
        }
        if batch_size == 0 {
            return Ok(TransitionBatch {
                transitions: vec![],
                ix_sample: Some(vec![]),
                weight: Some(vec![]),
            });
        }

        let total = self.sum_tree.total();
        if !(total > 0.0 && total.is_finite()) {
            return Err(HighwayError::Validation(format!(
                "total priority mass must be positive and finite, got {}",
                total
            )));
        }

        let beta = self.iw_scheduler.beta();
        let (slots, ws) = self.sum_tree.sample(batch_size, beta, &mut self.rng);
        let transitions = slots
            .iter()
            .filter_map(|&slot| self.ring.get(slot).cloned())
            .collect::<Vec<_>>();
        let ixs = slots.iter().map(|&slot| self.ring.index(slot)).collect();

        Ok(TransitionBatch {
            transitions,
            ix_sample: Some(ixs),
            weight: Some(ws),
        })
    }

    /// Overwrites priorities of sampled transitions.
    ///
    /// All handles and values are checked before any priority changes:
    /// a stale handle gives [`HighwayError::StaleIndex`], a negative or
    /// non-finite value or a length mismatch gives
    /// [`HighwayError::Validation`]. Values are floored at
    /// `priority_epsilon_floor`. Each successful call advances the schedule
    /// of `beta`.
    pub fn update_priorities(
        &mut self,
        ixs: &[SampleIndex],
        priorities: &[f32],
    ) -> Result<(), HighwayError> {
        if ixs.len() != priorities.len() {
            return Err(HighwayError::Validation(format!(
                "{} indices and {} priorities",
                ixs.len(),
                priorities.len()
            )));
        }
        if let Some(ix) = ixs.iter().find(|ix| !self.ring.is_current(ix)) {
            return Err(HighwayError::StaleIndex {
                slot: ix.slot,
                generation: ix.generation,
            });
        }
        for &p in priorities.iter() {
            Self::check_priority(p)?;
        }

        let floor = self.floor();
        for (ix, &p) in ixs.iter().zip(priorities.iter()) {
            self.sum_tree.set(ix.slot, p.max(floor));
        }
        self.iw_scheduler.step();
        Ok(())
    }

    /// Current exponent of importance sampling weights.
    pub fn beta(&self) -> f32 {
        self.iw_scheduler.beta()
    }

    /// Sum of `p^alpha` over stored transitions, the normalizer of sampling
    /// probabilities.
    pub fn total_priority(&self) -> f32 {
        self.sum_tree.total()
    }

    /// Priority of the transition at `slot`, `None` if the slot is empty.
    pub fn priority(&self, slot: usize) -> Option<f32> {
        self.sum_tree.priority(slot)
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
    pub fn config(&self) -> &PrioritizedReplayBufferConfig {
        &self.config
    }
}

impl ExperienceBufferBase for PrioritizedReplayBuffer {
    type Item = Transition;

    /// Pushes a transition with the maximum priority in the buffer.
    fn push(&mut self, tr: Transition) -> Result<(), HighwayError> {
        let p = self.max_priority();
        self.push_with_priority(tr, p)
    }

    fn len(&self) -> usize {
        self.ring.len()
    }
}

impl ReplayBufferBase for PrioritizedReplayBuffer {
    type Config = PrioritizedReplayBufferConfig;
    type Batch = TransitionBatch;

    fn build(config: &Self::Config) -> Result<Self, HighwayError> {
        config.buffer.validate()?;
        config.per.validate()?;
        let capacity = config.buffer.capacity;
        let per = &config.per;
        Ok(Self {
            config: config.clone(),
            ring: Ring::new(capacity),
            sum_tree: SumTree::new(capacity, per.alpha, per.normalize),
            iw_scheduler: IwScheduler::new(per.beta_start, per.beta_end, per.beta_anneal_steps),
            rng: StdRng::seed_from_u64(config.buffer.seed),
        })
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch, HighwayError> {
        self.sample(size)
    }

    /// Sets priorities to `|td_err| + priority_epsilon_floor`.
    fn update_priority(
        &mut self,
        ixs: &[SampleIndex],
        td_errs: &[f32],
    ) -> Result<(), HighwayError> {
        let floor = self.floor();
        let ps = td_errs.iter().map(|td| td.abs() + floor).collect::<Vec<_>>();
        self.update_priorities(ixs, &ps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay_buffer::{PerConfig, ReplayBufferConfig};

    fn transition(i: usize) -> Transition {
        Transition::new(vec![i as f32], 0, 0.0, vec![i as f32], false)
    }

    fn buffer(capacity: usize, per: PerConfig) -> PrioritizedReplayBuffer {
        let config = PrioritizedReplayBufferConfig::default()
            .buffer(ReplayBufferConfig::default().capacity(capacity).seed(7))
            .per(per);
        PrioritizedReplayBuffer::build(&config).unwrap()
    }

    #[test]
    fn test_default_priority_is_max() -> Result<(), HighwayError> {
        let mut buffer = buffer(8, PerConfig::default());
        assert_eq!(buffer.max_priority(), 1.0);
        buffer.push(transition(0))?;
        assert_eq!(buffer.priority(0), Some(1.0));

        buffer.push_with_priority(transition(1), 3.0)?;
        buffer.push(transition(2))?;
        assert_eq!(buffer.priority(2), Some(3.0));
        assert_eq!(buffer.max_priority(), 3.0);
        Ok(())
    }

    #[test]
    fn test_priority_floor() -> Result<(), HighwayError> {
        let mut buffer = buffer(4, PerConfig::default().priority_epsilon_floor(0.01));
        buffer.push_with_priority(transition(0), 0.0)?;
        assert_eq!(buffer.priority(0), Some(0.01));
        assert!(buffer.push_with_priority(transition(1), f32::NAN).is_err());
        assert!(buffer.push_with_priority(transition(1), -1.0).is_err());
        assert_eq!(buffer.len(), 1);
        Ok(())
    }

    #[test]
    fn test_update_is_atomic() -> Result<(), HighwayError> {
        let mut buffer = buffer(4, PerConfig::default());
        for i in 0..4 {
            buffer.push(transition(i))?;
        }
        let batch = buffer.sample(2)?;
        let ixs = batch.ix_sample.unwrap_or_default();
        assert_eq!(ixs.len(), 2);

        let res = buffer.update_priorities(&ixs, &[2.0, f32::INFINITY]);
        assert!(matches!(res, Err(HighwayError::Validation(_))));
        let res = buffer.update_priorities(&ixs, &[2.0]);
        assert!(matches!(res, Err(HighwayError::Validation(_))));
        assert!((0..4).all(|slot| buffer.priority(slot) == Some(1.0)));
        assert_eq!(buffer.beta(), 0.4);
        Ok(())
    }

    #[test]
    fn test_update_from_td_errors() -> Result<(), HighwayError> {
        let mut buffer = buffer(2, PerConfig::default().priority_epsilon_floor(0.5));
        buffer.push(transition(0))?;
        let batch = buffer.sample(1)?;
        let ixs = batch.ix_sample.unwrap_or_default();
        buffer.update_priority(&ixs, &[-2.0])?;
        assert_eq!(buffer.priority(0), Some(2.5));
        Ok(())
    }

    #[test]
    fn test_beta_annealing() -> Result<(), HighwayError> {
        let mut buffer = buffer(
            2,
            PerConfig::default()
                .beta_start(0.5)
                .beta_end(1.0)
                .beta_anneal_steps(2),
        );
        buffer.push(transition(0))?;
        assert_eq!(buffer.beta(), 0.5);
        for _ in 0..2 {
            let ixs = buffer.sample(1)?.ix_sample.unwrap_or_default();
            buffer.update_priorities(&ixs, &[1.0])?;
        }
        assert_eq!(buffer.beta(), 1.0);
        Ok(())
    }
}
