#![warn(missing_docs)]
//! Linear action-value function for highway-core without a tensor backend.
//!
//! [`LinearQNet`] computes `Q(s, a) = w_a . s + b_a` and is trained with plain
//! stochastic gradient descent. It implements
//! [`QNetwork`](highway_core::QNetwork), so it can be plugged into
//! [`Dqn`](highway_core::dqn::Dqn) as both the online and the target network.
mod config;
mod linear;
pub use config::LinearQNetConfig;
pub use linear::{LinearParams, LinearQNet};
