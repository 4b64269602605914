//! Core interfaces.
mod env;
mod q_network;
mod replay_buffer;
mod step;
pub use env::Env;
pub use q_network::{argmax, CriticLoss, FitBatch, QNetwork};
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
pub use step::Step;
