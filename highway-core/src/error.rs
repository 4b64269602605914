//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum HighwayError {
    /// The buffer holds fewer transitions than requested.
    ///
    /// Expected during warm-up; callers skip the learning step.
    #[error("Insufficient data: requested {requested} transitions, {available} stored")]
    InsufficientData {
        /// Requested batch size.
        requested: usize,
        /// Number of transitions in the buffer.
        available: usize,
    },

    /// A sample handle refers to a slot overwritten after the sample was drawn.
    #[error("Stale index: slot {slot} is no longer at generation {generation}")]
    StaleIndex {
        /// Slot in the ring.
        slot: usize,
        /// Generation recorded in the handle.
        generation: u64,
    },

    /// Failure of the function approximator during predict or fit.
    #[error("Training error: {0}")]
    Training(#[source] anyhow::Error),

    /// Malformed input detected at a boundary.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),
}

impl HighwayError {
    /// Returns `true` for [`HighwayError::InsufficientData`].
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}
