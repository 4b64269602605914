//! Train [`Dqn`] agent.
mod config;
use crate::{
    base::{Env, ExperienceBufferBase, QNetwork, ReplayBufferBase},
    dqn::Dqn,
    record::{Record, RecordValue::Scalar, Recorder},
    replay_buffer::{Transition, TransitionBatch},
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::info;

/// Runs training episodes.
///
/// In each step of an episode, the agent selects an action, the environment
/// is stepped, the transition is stored in the agent's buffer and the agent
/// performs one optimization step. An episode ends when the environment
/// reports `done` or after `max_steps_per_episode` steps.
///
/// ```no_run
/// # use highway_core::{
/// #     dqn::{Dqn, DqnConfig},
/// #     dummy::{DummyEnv, DummyEnvConfig, DummyQNet},
/// #     record::NullRecorder,
/// #     replay_buffer::{ReplayBuffer, ReplayBufferConfig},
/// #     Env, ReplayBufferBase, Trainer, TrainerConfig,
/// # };
/// # fn main() -> anyhow::Result<()> {
/// let env_config = DummyEnvConfig { state_dim: 2, n_actions: 3, episode_len: 10, best_action: 1 };
/// let mut env = DummyEnv::build(&env_config, 0)?;
/// let buffer = ReplayBuffer::build(&ReplayBufferConfig::default())?;
/// let mut agent = Dqn::build(DqnConfig::default(), DummyQNet::new(3), DummyQNet::new(3), buffer)?;
/// let mut trainer = Trainer::build(TrainerConfig::default().n_episodes(100));
/// let rewards = trainer.train(&mut env, &mut agent, &mut NullRecorder {})?;
/// # Ok(())
/// # }
/// ```
pub struct Trainer {
    n_episodes: usize,
    max_steps_per_episode: usize,
    record_interval: usize,
}

impl Trainer {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig) -> Self {
        Self {
            n_episodes: config.n_episodes,
            max_steps_per_episode: config.max_steps_per_episode,
            record_interval: config.record_interval,
        }
    }

    /// Runs one episode and returns the cumulative reward, the number of
    /// steps and the mean loss over the optimization steps.
    fn run_episode<E, Q, R>(&self, env: &mut E, agent: &mut Dqn<Q, R>) -> Result<(f32, usize, Option<f32>)>
    where
        E: Env,
        Q: QNetwork,
        R: ExperienceBufferBase<Item = Transition> + ReplayBufferBase<Batch = TransitionBatch>,
    {
        let mut state = env.reset()?;
        let mut reward_sum = 0f32;
        let mut steps = 0;
        let mut loss_sum = 0f32;
        let mut n_opts = 0;

        while steps < self.max_steps_per_episode {
            let act = agent.select_action(&state)?;
            let step = env.step(act)?;
            steps += 1;
            reward_sum += step.reward;
            agent.observe_and_store(state, act, step.reward, step.next_state.clone(), step.done)?;

            if let Some(record) = agent.learn()? {
                loss_sum += record.get_scalar("loss")?;
                n_opts += 1;
            }

            if step.done {
                break;
            }
            state = step.next_state;
        }

        let loss = if n_opts > 0 {
            Some(loss_sum / n_opts as f32)
        } else {
            None
        };
        Ok((reward_sum, steps, loss))
    }

    /// Trains the agent and returns the cumulative reward of each episode.
    ///
    /// One record per episode is written to `recorder` with keys `episode`,
    /// `episode_reward`, `episode_steps`, `epsilon` and, once learning has
    /// started, `loss`.
    pub fn train<E, Q, R, D>(
        &mut self,
        env: &mut E,
        agent: &mut Dqn<Q, R>,
        recorder: &mut D,
    ) -> Result<Vec<f32>>
    where
        E: Env,
        Q: QNetwork,
        R: ExperienceBufferBase<Item = Transition> + ReplayBufferBase<Batch = TransitionBatch>,
        D: Recorder,
    {
        let mut rewards = Vec::with_capacity(self.n_episodes);
        agent.train();

        for episode in 0..self.n_episodes {
            let (reward, steps, loss) = self.run_episode(env, agent)?;
            rewards.push(reward);

            let mut record = Record::from_slice(&[
                ("episode", Scalar(episode as f32)),
                ("episode_reward", Scalar(reward)),
                ("episode_steps", Scalar(steps as f32)),
                ("epsilon", Scalar(agent.epsilon())),
            ]);
            if let Some(loss) = loss {
                record.insert("loss", Scalar(loss));
            }
            recorder.write(record);

            if self.record_interval > 0 && (episode + 1) % self.record_interval == 0 {
                let recent = &rewards[rewards.len() - self.record_interval..];
                let mean = recent.iter().sum::<f32>() / recent.len() as f32;
                info!(
                    "Episode {}: mean reward {:.3} over the last {} episodes, epsilon {:.3}",
                    episode + 1,
                    mean,
                    self.record_interval,
                    agent.epsilon()
                );
            }
        }

        Ok(rewards)
    }
}
