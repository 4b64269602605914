//! Exploration strategy of DQN.
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Schedule of epsilon as a function of the number of decay steps `n`.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum EpsilonDecay {
    /// `eps_end + (eps_start - eps_end) * exp(-n / decay_steps)`.
    Exponential {
        /// Time constant of the decay.
        decay_steps: f32,
    },

    /// Linear interpolation reaching `eps_end` at `final_step`.
    Linear {
        /// Step at which epsilon reaches `eps_end`.
        final_step: usize,
    },

    /// `eps_start * factor^n`, bounded below by `eps_end`.
    Multiplicative {
        /// Factor applied at each step.
        factor: f32,
    },
}

/// Epsilon-greedy explorer for DQN.
///
/// The current epsilon is a pure function of `n_decays`, which is advanced
/// by [`EpsilonGreedy::decay`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    /// Epsilon before any decay.
    pub eps_start: f32,

    /// Lower bound of epsilon.
    pub eps_end: f32,

    /// Decay schedule.
    pub decay: EpsilonDecay,

    /// Number of decay steps so far.
    #[serde(default)]
    pub n_decays: usize,
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self {
            eps_start: 0.9,
            eps_end: 0.05,
            decay: EpsilonDecay::Exponential { decay_steps: 200.0 },
            n_decays: 0,
        }
    }
}

impl EpsilonGreedy {
    /// Set the epsilon value at the start.
    pub fn eps_start(mut self, v: f32) -> Self {
        self.eps_start = v;
        self
    }

    /// Set the lower bound of epsilon.
    pub fn eps_end(mut self, v: f32) -> Self {
        self.eps_end = v;
        self
    }

    /// Set the decay schedule.
    pub fn decay_schedule(mut self, v: EpsilonDecay) -> Self {
        self.decay = v;
        self
    }

    /// Epsilon after `n` decay steps.
    pub fn epsilon_at(&self, n: usize) -> f32 {
        let (start, end) = (self.eps_start, self.eps_end);
        match self.decay {
            EpsilonDecay::Exponential { decay_steps } => {
                if decay_steps <= 0.0 {
                    end
                } else {
                    end + (start - end) * (-(n as f32) / decay_steps).exp()
                }
            }
            EpsilonDecay::Linear { final_step } => {
                if n >= final_step {
                    end
                } else {
                    let d = (start - end) / final_step as f32;
                    (start - d * n as f32).max(end)
                }
            }
            EpsilonDecay::Multiplicative { factor } => {
                let n = n.min(i32::MAX as usize) as i32;
                (start * factor.powi(n)).max(end)
            }
        }
    }

    /// Current epsilon.
    pub fn eps(&self) -> f32 {
        self.epsilon_at(self.n_decays)
    }

    /// Advances the schedule by one step.
    pub fn decay(&mut self) {
        self.n_decays = self.n_decays.saturating_add(1);
    }

    /// Returns `true` if the next action should be random.
    pub fn is_random(&self, rng: &mut impl Rng) -> bool {
        rng.gen::<f32>() < self.eps()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn test_exponential_decay() {
        let explorer = EpsilonGreedy::default();
        assert!((explorer.epsilon_at(0) - 0.9).abs() < 1e-6);
        let e200 = 0.05 + 0.85 * (-1f32).exp();
        assert!((explorer.epsilon_at(200) - e200).abs() < 1e-6);
        assert!((explorer.epsilon_at(100_000) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_linear_decay() {
        let explorer = EpsilonGreedy::default()
            .eps_start(1.0)
            .eps_end(0.1)
            .decay_schedule(EpsilonDecay::Linear { final_step: 10 });
        assert_eq!(explorer.epsilon_at(0), 1.0);
        assert!((explorer.epsilon_at(5) - 0.55).abs() < 1e-6);
        assert_eq!(explorer.epsilon_at(10), 0.1);
        assert_eq!(explorer.epsilon_at(20), 0.1);
    }

    #[test]
    fn test_multiplicative_decay() {
        let mut explorer = EpsilonGreedy::default()
            .eps_start(1.0)
            .eps_end(0.3)
            .decay_schedule(EpsilonDecay::Multiplicative { factor: 0.5 });
        explorer.decay();
        assert_eq!(explorer.eps(), 0.5);
        explorer.decay();
        assert_eq!(explorer.eps(), 0.3);
    }

    #[test]
    fn test_is_random() {
        let mut rng = SmallRng::seed_from_u64(0);
        let greedy = EpsilonGreedy::default().eps_start(0.0).eps_end(0.0);
        assert!((0..1000).all(|_| !greedy.is_random(&mut rng)));

        let random = EpsilonGreedy::default().eps_start(1.0).eps_end(1.0);
        assert!((0..1000).all(|_| random.is_random(&mut rng)));

        let half = EpsilonGreedy::default().eps_start(0.5).eps_end(0.5);
        let n = (0..4000).filter(|_| half.is_random(&mut rng)).count();
        assert!(n > 1800 && n < 2200);
    }
}
