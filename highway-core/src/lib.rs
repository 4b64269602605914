#![warn(missing_docs)]
//! Core components for training a DQN agent to drive on a highway.
//!
//! The crate provides a uniform [`ReplayBuffer`](replay_buffer::ReplayBuffer),
//! a [`PrioritizedReplayBuffer`](replay_buffer::PrioritizedReplayBuffer), the
//! [`Dqn`](dqn::Dqn) agent consuming either of them, and a [`Trainer`] running
//! episodes of an [`Env`]. The action-value function is abstracted by
//! [`QNetwork`]; the simulator by [`Env`].
//!
//! A single environment step proceeds as follows:
//!
//! 1. the agent selects an action (epsilon-greedy in training mode),
//! 2. the environment is stepped,
//! 3. the transition is pushed into the buffer,
//! 4. the agent samples a batch, computes targets with the target network
//!    and fits the online network,
//! 5. priorities of the sampled transitions are updated (prioritized buffer
//!    only),
//! 6. epsilon decays and the target network is synchronized periodically.
pub mod dqn;
pub mod dummy;
pub mod error;
pub mod record;
pub mod replay_buffer;
pub mod util;

mod base;
pub use base::{
    argmax, CriticLoss, Env, ExperienceBufferBase, FitBatch, QNetwork, ReplayBufferBase, Step,
};

mod trainer;
pub use trainer::{Trainer, TrainerConfig};
