//! DQN agent.
use super::{DqnConfig, EpsilonGreedy};
use crate::{
    base::{argmax, CriticLoss, ExperienceBufferBase, FitBatch, QNetwork, ReplayBufferBase},
    error::HighwayError,
    record::{Record, RecordValue},
    replay_buffer::{Transition, TransitionBatch},
};
use anyhow::anyhow;
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// DQN agent.
///
/// The agent owns a replay buffer, the online network `qnet` and the target
/// network `qnet_tgt`. The two networks never share parameters: the target is
/// overwritten with a copy of the online parameters when the agent is built
/// and then every `target_sync_period` optimization steps.
///
/// With [`PrioritizedReplayBuffer`](crate::replay_buffer::PrioritizedReplayBuffer),
/// losses are weighted by importance sampling weights and priorities of
/// sampled transitions are updated with their TD errors after each step.
pub struct Dqn<Q, R>
where
    Q: QNetwork,
    R: ExperienceBufferBase<Item = Transition> + ReplayBufferBase<Batch = TransitionBatch>,
{
    batch_size: usize,
    discount_factor: f32,
    target_sync_period: usize,
    critic_loss: CriticLoss,
    explorer: EpsilonGreedy,
    qnet: Q,
    qnet_tgt: Q,
    buffer: R,
    train: bool,
    n_opts: usize,
    rng: SmallRng,
}

impl<Q, R> Dqn<Q, R>
where
    Q: QNetwork,
    R: ExperienceBufferBase<Item = Transition> + ReplayBufferBase<Batch = TransitionBatch>,
{
    /// Constructs DQN agent.
    ///
    /// The agent starts in training mode.
    pub fn build(config: DqnConfig, qnet: Q, qnet_tgt: Q, buffer: R) -> Result<Self, HighwayError> {
        config.validate()?;
        if qnet.n_actions() == 0 || qnet.n_actions() != qnet_tgt.n_actions() {
            return Err(HighwayError::Validation(format!(
                "number of actions of online ({}) and target ({}) networks",
                qnet.n_actions(),
                qnet_tgt.n_actions()
            )));
        }

        let mut agent = Self {
            batch_size: config.batch_size,
            discount_factor: config.discount_factor,
            target_sync_period: config.target_sync_period,
            critic_loss: config.critic_loss,
            explorer: config.explorer,
            qnet,
            qnet_tgt,
            buffer,
            train: true,
            n_opts: 0,
            rng: SmallRng::seed_from_u64(config.seed),
        };
        agent.sync_target()?;
        Ok(agent)
    }

    fn sync_target(&mut self) -> Result<(), HighwayError> {
        self.qnet_tgt
            .set_parameters(self.qnet.get_parameters())
            .map_err(HighwayError::Training)
    }

    fn check_output(
        values: &[Vec<f32>],
        n_rows: usize,
        n_actions: usize,
    ) -> Result<(), HighwayError> {
        if values.len() != n_rows || values.iter().any(|v| v.len() != n_actions) {
            return Err(HighwayError::Training(anyhow!(
                "network output does not have shape [{}, {}]",
                n_rows,
                n_actions
            )));
        }
        Ok(())
    }

    fn check_finite(name: &str, values: &[f32]) -> Result<(), HighwayError> {
        match values.iter().position(|v| !v.is_finite()) {
            Some(i) => Err(HighwayError::Training(anyhow!(
                "non-finite {} at row {}: {}",
                name,
                i,
                values[i]
            ))),
            None => Ok(()),
        }
    }

    /// Selects an action for `state`.
    ///
    /// In training mode, a uniformly random action is taken with probability
    /// epsilon and the greedy action otherwise. In evaluation mode the action
    /// is always greedy. The network is not called for random actions.
    pub fn select_action(&mut self, state: &[f32]) -> Result<usize, HighwayError> {
        let n_actions = self.qnet.n_actions();
        if self.train && self.explorer.is_random(&mut self.rng) {
            return Ok(self.rng.gen_range(0..n_actions));
        }

        let q = self.qnet.predict(&[state]).map_err(HighwayError::Training)?;
        Self::check_output(&q, 1, n_actions)?;
        argmax(&q[0]).ok_or_else(|| HighwayError::Training(anyhow!("empty action values")))
    }

    /// Stores a transition in the replay buffer.
    pub fn observe_and_store(
        &mut self,
        state: Vec<f32>,
        action: usize,
        reward: f32,
        next_state: Vec<f32>,
        done: bool,
    ) -> Result<(), HighwayError> {
        let n_actions = self.qnet.n_actions();
        if action >= n_actions {
            return Err(HighwayError::Validation(format!(
                "action {} out of range 0..{}",
                action, n_actions
            )));
        }
        self.buffer
            .push(Transition::new(state, action, reward, next_state, done))
    }

    fn targets(&self, batch: &TransitionBatch, n_actions: usize) -> Result<Vec<f32>, HighwayError> {
        let next_states = batch
            .transitions
            .iter()
            .map(|tr| tr.next_state.as_slice())
            .collect::<Vec<_>>();
        let q_next = self
            .qnet_tgt
            .predict(&next_states)
            .map_err(HighwayError::Training)?;
        Self::check_output(&q_next, batch.len(), n_actions)?;

        Ok(batch
            .transitions
            .iter()
            .zip(q_next.iter())
            .map(|(tr, q)| {
                if tr.done {
                    tr.reward
                } else {
                    let q_max = q.iter().fold(f32::NEG_INFINITY, |m, &v| m.max(v));
                    tr.reward + self.discount_factor * q_max
                }
            })
            .collect())
    }

    fn update_critic(&mut self, batch: TransitionBatch) -> Result<f32, HighwayError> {
        let n_actions = self.qnet.n_actions();
        if let Some(tr) = batch.transitions.iter().find(|tr| tr.action >= n_actions) {
            return Err(HighwayError::Validation(format!(
                "action {} out of range 0..{}",
                tr.action, n_actions
            )));
        }

        let targets = self.targets(&batch, n_actions)?;
        Self::check_finite("TD target", &targets)?;
        let states = batch
            .transitions
            .iter()
            .map(|tr| tr.state.as_slice())
            .collect::<Vec<_>>();
        let actions = batch
            .transitions
            .iter()
            .map(|tr| tr.action)
            .collect::<Vec<_>>();

        // TD errors from the estimates before the update
        let td_errs = match &batch.ix_sample {
            Some(_) => {
                let q = self.qnet.predict(&states).map_err(HighwayError::Training)?;
                Self::check_output(&q, batch.len(), n_actions)?;
                let td_errs = q
                    .iter()
                    .zip(actions.iter())
                    .zip(targets.iter())
                    .map(|((q, &a), y)| y - q[a])
                    .collect::<Vec<_>>();
                Self::check_finite("TD error", &td_errs)?;
                Some(td_errs)
            }
            None => None,
        };

        let loss = self
            .qnet
            .fit_batch(FitBatch {
                states: &states,
                actions: &actions,
                targets: &targets,
                weights: batch.weight.as_deref(),
                loss: self.critic_loss,
            })
            .map_err(HighwayError::Training)?;

        if let (Some(ixs), Some(td_errs)) = (&batch.ix_sample, td_errs) {
            self.buffer
                .update_priority(ixs, &td_errs)
                .map_err(|e| HighwayError::Training(e.into()))?;
        }

        Ok(loss)
    }

    /// Performs one optimization step.
    ///
    /// Returns `Ok(None)` without touching the networks while the buffer
    /// holds fewer than `batch_size` transitions. Otherwise samples a batch,
    /// fits the online network to TD targets computed with the target
    /// network, updates priorities if the buffer has them, decays epsilon
    /// and synchronizes the target network every `target_sync_period` steps.
    ///
    /// Failures of the networks and non-finite targets or TD errors are
    /// returned as [`HighwayError::Training`]. These are detected before the
    /// fit, so the networks, priorities, epsilon and the step counter are left
    /// as they were.
    pub fn learn(&mut self) -> Result<Option<Record>, HighwayError> {
        if self.buffer.len() < self.batch_size {
            log::trace!(
                "Skip learning: {} transitions, batch size {}",
                self.buffer.len(),
                self.batch_size
            );
            return Ok(None);
        }

        let batch = self.buffer.batch(self.batch_size)?;
        let mean_weight = batch.mean_weight();
        let loss = self.update_critic(batch)?;

        self.explorer.decay();
        self.n_opts += 1;
        if self.n_opts % self.target_sync_period == 0 {
            self.sync_target()?;
            log::debug!("Synchronized target network at {} optimization steps", self.n_opts);
        }

        let mut record = Record::from_slice(&[
            ("loss", RecordValue::Scalar(loss)),
            ("epsilon", RecordValue::Scalar(self.explorer.eps())),
            ("n_opts", RecordValue::Scalar(self.n_opts as f32)),
        ]);
        if let Some(w) = mean_weight {
            record.insert("mean_weight", RecordValue::Scalar(w));
        }
        Ok(Some(record))
    }

    /// Set the agent in training mode.
    pub fn train(&mut self) {
        self.train = true;
    }

    /// Set the agent in evaluation mode.
    pub fn eval(&mut self) {
        self.train = false;
    }

    /// Returns `true` if the agent is in training mode.
    pub fn is_train(&self) -> bool {
        self.train
    }

    /// Number of optimization steps.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// Current epsilon of the explorer.
    pub fn epsilon(&self) -> f32 {
        self.explorer.eps()
    }

    /// Replay buffer.
    pub fn buffer(&self) -> &R {
        &self.buffer
    }

    /// Mutable reference to the replay buffer.
    pub fn buffer_mut(&mut self) -> &mut R {
        &mut self.buffer
    }

    /// Online network.
    pub fn qnet(&self) -> &Q {
        &self.qnet
    }

    /// Target network.
    pub fn qnet_tgt(&self) -> &Q {
        &self.qnet_tgt
    }
}
