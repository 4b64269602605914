//! Utilities for interaction of agents and environments.
use crate::{
    base::{Env, ExperienceBufferBase, QNetwork, ReplayBufferBase},
    dqn::Dqn,
    replay_buffer::{Transition, TransitionBatch},
};
use anyhow::Result;

fn eval_episode<E, Q, R>(env: &mut E, agent: &mut Dqn<Q, R>, max_steps: usize) -> Result<f32>
where
    E: Env,
    Q: QNetwork,
    R: ExperienceBufferBase<Item = Transition> + ReplayBufferBase<Batch = TransitionBatch>,
{
    let mut state = env.reset()?;
    let mut r_sum = 0f32;
    for _ in 0..max_steps {
        let act = agent.select_action(&state)?;
        let step = env.step(act)?;
        r_sum += step.reward;
        if step.done {
            break;
        }
        state = step.next_state;
    }
    Ok(r_sum)
}

/// Runs greedy episodes and returns the cumulative reward of each.
///
/// An episode ends when the environment reports `done` or after `max_steps`
/// steps.
///
/// Nothing is stored in the buffer and no learning takes place. The agent
/// is put in evaluation mode during the episodes and restored to its
/// previous mode afterwards.
pub fn eval<E, Q, R>(
    env: &mut E,
    agent: &mut Dqn<Q, R>,
    n_episodes: usize,
    max_steps: usize,
) -> Result<Vec<f32>>
where
    E: Env,
    Q: QNetwork,
    R: ExperienceBufferBase<Item = Transition> + ReplayBufferBase<Batch = TransitionBatch>,
{
    let was_train = agent.is_train();
    agent.eval();

    let mut rewards = Vec::with_capacity(n_episodes);
    let mut res = Ok(());
    for _ in 0..n_episodes {
        match eval_episode(env, agent, max_steps) {
            Ok(r) => rewards.push(r),
            Err(e) => {
                res = Err(e);
                break;
            }
        }
    }

    if was_train {
        agent.train();
    }
    res.map(|_| rewards)
}
