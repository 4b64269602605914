//! Transition.
use crate::error::HighwayError;
use serde::{Deserialize, Serialize};

/// One step of interaction between the agent and an environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// State in which the action was taken.
    pub state: Vec<f32>,

    /// Index of the action.
    pub action: usize,

    /// Reward.
    pub reward: f32,

    /// State after the action.
    pub next_state: Vec<f32>,

    /// Terminal-step flag.
    pub done: bool,
}

impl Transition {
    /// Constructs a transition.
    pub fn new(
        state: Vec<f32>,
        action: usize,
        reward: f32,
        next_state: Vec<f32>,
        done: bool,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            done,
        }
    }

    /// Checks the shapes of the states and the range of the action.
    pub(crate) fn validate(
        &self,
        state_dim: Option<usize>,
        n_actions: Option<usize>,
    ) -> Result<(), HighwayError> {
        if let Some(dim) = state_dim {
            if self.state.len() != dim || self.next_state.len() != dim {
                return Err(HighwayError::Validation(format!(
                    "state dimension mismatch: expected {}, got {} and {}",
                    dim,
                    self.state.len(),
                    self.next_state.len()
                )));
            }
        }
        if let Some(n) = n_actions {
            if self.action >= n {
                return Err(HighwayError::Validation(format!(
                    "action {} out of range 0..{}",
                    self.action, n
                )));
            }
        }
        if !self.reward.is_finite() {
            return Err(HighwayError::Validation(format!(
                "non-finite reward: {}",
                self.reward
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Transition;

    #[test]
    fn test_validate() {
        let tr = Transition::new(vec![0.0; 3], 1, 0.5, vec![0.0; 3], false);
        assert!(tr.validate(Some(3), Some(2)).is_ok());
        assert!(tr.validate(None, None).is_ok());
        assert!(tr.validate(Some(4), None).is_err());
        assert!(tr.validate(None, Some(1)).is_err());

        let tr = Transition::new(vec![0.0; 3], 0, f32::NAN, vec![0.0; 2], true);
        assert!(tr.validate(None, None).is_err());
        assert!(tr.validate(Some(3), None).is_err());
    }
}
