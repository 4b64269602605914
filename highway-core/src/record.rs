//! Key-value records of training and evaluation metrics.
//!
//! [`Dqn::learn`](crate::dqn::Dqn::learn) returns a [`Record`] for every
//! optimization step and [`Trainer`](crate::Trainer) writes one per episode
//! into a [`Recorder`].
//!
//! ```rust
//! use highway_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode", RecordValue::Scalar(3.0));
//! record.insert("episode_reward", RecordValue::Scalar(-1.5));
//! assert_eq!(record.get_scalar("episode_reward").unwrap(), -1.5);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
