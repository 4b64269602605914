//! Replay buffers.
//!
//! [`ReplayBuffer`] samples stored transitions uniformly with replacement.
//! [`PrioritizedReplayBuffer`] samples them proportionally to their priorities
//! and returns importance sampling weights along with handles used to update
//! the priorities after a learning step.
//!
//! Both buffers store at most `capacity` transitions and overwrite the oldest
//! one when full.
//!
//! ```
//! use highway_core::{
//!     replay_buffer::{ReplayBuffer, ReplayBufferConfig, Transition},
//!     ExperienceBufferBase, ReplayBufferBase,
//! };
//!
//! let config = ReplayBufferConfig::default().capacity(2);
//! let mut buffer = ReplayBuffer::build(&config).unwrap();
//! for i in 0..3 {
//!     let tr = Transition::new(vec![i as f32], 0, 1.0, vec![i as f32 + 1.0], false);
//!     buffer.push(tr).unwrap();
//! }
//! assert_eq!(buffer.len(), 2);
//! assert_eq!(buffer.iter().next().unwrap().state, vec![1.0]);
//! ```
mod batch;
mod config;
mod prioritized;
mod ring;
mod transition;
mod uniform;
pub use batch::{SampleIndex, TransitionBatch};
pub use config::{PerConfig, PrioritizedReplayBufferConfig, ReplayBufferConfig};
pub use prioritized::{IwScheduler, PrioritizedReplayBuffer, WeightNormalizer};
pub use transition::Transition;
pub use uniform::ReplayBuffer;
