//! Configuration of replay buffers.
use super::WeightNormalizer;
use crate::error::HighwayError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`ReplayBuffer`](super::ReplayBuffer).
///
/// `state_dim` and `n_actions` are optional. When given, pushed transitions
/// are checked against them.
///
/// ```
/// use highway_core::replay_buffer::ReplayBufferConfig;
///
/// let config = ReplayBufferConfig::default()
///     .capacity(10_000)
///     .seed(42)
///     .state_dim(Some(25))
///     .n_actions(Some(5));
/// assert_eq!(config.capacity, 10_000);
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReplayBufferConfig {
    /// Maximum number of transitions.
    pub capacity: usize,

    /// Random seed used for sampling.
    pub seed: u64,

    /// Dimension of states, checked on push if given.
    pub state_dim: Option<usize>,

    /// Number of actions, checked on push if given.
    pub n_actions: Option<usize>,
}

impl Default for ReplayBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            seed: 42,
            state_dim: None,
            n_actions: None,
        }
    }
}

impl ReplayBufferConfig {
    /// Sets the capacity of the replay buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the random seed for sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the dimension of states.
    pub fn state_dim(mut self, state_dim: Option<usize>) -> Self {
        self.state_dim = state_dim;
        self
    }

    /// Sets the number of actions.
    pub fn n_actions(mut self, n_actions: Option<usize>) -> Self {
        self.n_actions = n_actions;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), HighwayError> {
        if self.capacity == 0 {
            return Err(HighwayError::Validation(
                "capacity must be positive".to_string(),
            ));
        }
        if self.n_actions == Some(0) {
            return Err(HighwayError::Validation(
                "n_actions must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Loads [`ReplayBufferConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        log::info!("Load config of replay buffer from {}", path_.to_str().unwrap_or("?"));
        Ok(b)
    }

    /// Saves [`ReplayBufferConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        log::info!("Save config of replay buffer into {}", path_.to_str().unwrap_or("?"));
        Ok(())
    }
}

/// Parameters of prioritized sampling.
///
/// The probability of sampling slot `i` is `p_i^alpha / sum_j p_j^alpha`.
/// `alpha = 0` gives uniform sampling. The exponent `beta` of importance
/// sampling weights moves linearly from `beta_start` to `beta_end` over
/// `beta_anneal_steps` priority updates.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PerConfig {
    /// Exponent applied to priorities.
    pub alpha: f32,

    /// Initial value of the exponent of importance sampling weights.
    pub beta_start: f32,

    /// Final value of the exponent of importance sampling weights.
    pub beta_end: f32,

    /// Number of priority updates until `beta` reaches `beta_end`.
    pub beta_anneal_steps: usize,

    /// Lower bound of stored priorities, also added to absolute TD errors.
    pub priority_epsilon_floor: f32,

    /// Normalization of importance sampling weights.
    pub normalize: WeightNormalizer,
}

impl Default for PerConfig {
    fn default() -> Self {
        Self {
            alpha: 0.6,
            beta_start: 0.4,
            beta_end: 1.0,
            beta_anneal_steps: 1000,
            priority_epsilon_floor: 1e-5,
            normalize: WeightNormalizer::Batch,
        }
    }
}

impl PerConfig {
    /// Sets `alpha`.
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the initial value of `beta`.
    pub fn beta_start(mut self, beta_start: f32) -> Self {
        self.beta_start = beta_start;
        self
    }

    /// Sets the final value of `beta`.
    pub fn beta_end(mut self, beta_end: f32) -> Self {
        self.beta_end = beta_end;
        self
    }

    /// Sets the number of priority updates for annealing `beta`.
    pub fn beta_anneal_steps(mut self, beta_anneal_steps: usize) -> Self {
        self.beta_anneal_steps = beta_anneal_steps;
        self
    }

    /// Sets the lower bound of priorities.
    pub fn priority_epsilon_floor(mut self, priority_epsilon_floor: f32) -> Self {
        self.priority_epsilon_floor = priority_epsilon_floor;
        self
    }

    /// Sets the normalization of importance sampling weights.
    pub fn normalize(mut self, normalize: WeightNormalizer) -> Self {
        self.normalize = normalize;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), HighwayError> {
        if !(self.alpha >= 0.0 && self.alpha.is_finite()) {
            return Err(HighwayError::Validation(format!(
                "alpha must be non-negative, got {}",
                self.alpha
            )));
        }
        for (name, beta) in [("beta_start", self.beta_start), ("beta_end", self.beta_end)] {
            if !(0.0..=1.0).contains(&beta) {
                return Err(HighwayError::Validation(format!(
                    "{} must be in [0, 1], got {}",
                    name, beta
                )));
            }
        }
        if !(self.priority_epsilon_floor > 0.0 && self.priority_epsilon_floor.is_finite()) {
            return Err(HighwayError::Validation(format!(
                "priority_epsilon_floor must be positive, got {}",
                self.priority_epsilon_floor
            )));
        }
        Ok(())
    }
}

/// Configuration of [`PrioritizedReplayBuffer`](super::PrioritizedReplayBuffer).
///
/// ```
/// use highway_core::replay_buffer::{
///     PerConfig, PrioritizedReplayBufferConfig, ReplayBufferConfig, WeightNormalizer,
/// };
///
/// let config = PrioritizedReplayBufferConfig::default()
///     .buffer(ReplayBufferConfig::default().capacity(10_000))
///     .per(PerConfig::default().alpha(0.6).normalize(WeightNormalizer::All));
/// assert_eq!(config.per.beta_start, 0.4);
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct PrioritizedReplayBufferConfig {
    /// Storage parameters.
    pub buffer: ReplayBufferConfig,

    /// Parameters of prioritized sampling.
    pub per: PerConfig,
}

impl PrioritizedReplayBufferConfig {
    /// Sets the storage parameters.
    pub fn buffer(mut self, buffer: ReplayBufferConfig) -> Self {
        self.buffer = buffer;
        self
    }

    /// Sets the parameters of prioritized sampling.
    pub fn per(mut self, per: PerConfig) -> Self {
        self.per = per;
        self
    }

    /// Loads [`PrioritizedReplayBufferConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        log::info!(
            "Load config of prioritized replay buffer from {}",
            path_.to_str().unwrap_or("?")
        );
        Ok(b)
    }

    /// Saves [`PrioritizedReplayBufferConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        log::info!(
            "Save config of prioritized replay buffer into {}",
            path_.to_str().unwrap_or("?")
        );
        Ok(())
    }
}
