//! DQN agent.
mod base;
mod config;
mod explorer;
pub use base::Dqn;
pub use config::DqnConfig;
pub use explorer::{EpsilonDecay, EpsilonGreedy};
