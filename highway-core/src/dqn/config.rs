//! Configuration of DQN agent.
use super::EpsilonGreedy;
use crate::{base::CriticLoss, error::HighwayError};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Dqn`](super::Dqn) agent.
///
/// The learning rate belongs to the configuration of the action-value
/// function, not to the agent.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DqnConfig {
    /// Number of transitions in a batch. `learn()` is a no-op while the
    /// buffer holds fewer transitions.
    pub batch_size: usize,

    /// Discount factor `gamma`.
    pub discount_factor: f32,

    /// The target network is overwritten by the online network every
    /// `target_sync_period` optimization steps.
    pub target_sync_period: usize,

    /// Loss between predicted values and targets.
    pub critic_loss: CriticLoss,

    /// Exploration strategy.
    pub explorer: EpsilonGreedy,

    /// Random seed for exploration.
    pub seed: u64,
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            discount_factor: 0.8,
            target_sync_period: 50,
            critic_loss: CriticLoss::Mse,
            explorer: EpsilonGreedy::default(),
            seed: 42,
        }
    }
}

impl DqnConfig {
    /// Sets batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets discount factor.
    pub fn discount_factor(mut self, v: f32) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the period of target network synchronization.
    pub fn target_sync_period(mut self, v: usize) -> Self {
        self.target_sync_period = v;
        self
    }

    /// Sets critic loss.
    pub fn critic_loss(mut self, v: CriticLoss) -> Self {
        self.critic_loss = v;
        self
    }

    /// Sets explorer.
    pub fn explorer(mut self, v: EpsilonGreedy) -> Self {
        self.explorer = v;
        self
    }

    /// Sets random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), HighwayError> {
        if self.batch_size == 0 {
            return Err(HighwayError::Validation(
                "batch_size must be positive".to_string(),
            ));
        }
        if self.target_sync_period == 0 {
            return Err(HighwayError::Validation(
                "target_sync_period must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(HighwayError::Validation(format!(
                "discount_factor must be in [0, 1], got {}",
                self.discount_factor
            )));
        }
        Ok(())
    }

    /// Loads [`DqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        log::info!("Load config of DQN agent from {}", path_.to_str().unwrap_or("?"));
        Ok(b)
    }

    /// Saves [`DqnConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        log::info!("Save config of DQN agent into {}", path_.to_str().unwrap_or("?"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dqn::EpsilonDecay;
    use tempdir::TempDir;

    #[test]
    fn test_serde_dqn_config() -> Result<()> {
        let config = DqnConfig::default()
            .batch_size(64)
            .discount_factor(0.99)
            .target_sync_period(10)
            .critic_loss(CriticLoss::SmoothL1)
            .explorer(
                EpsilonGreedy::default()
                    .decay_schedule(EpsilonDecay::Linear { final_step: 1000 }),
            );

        let dir = TempDir::new("dqn_config")?;
        let path = dir.path().join("dqn_config.yaml");
        config.save(&path)?;
        let config_ = DqnConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_validate() {
        assert!(DqnConfig::default().validate().is_ok());
        assert!(DqnConfig::default().batch_size(0).validate().is_err());
        assert!(DqnConfig::default().target_sync_period(0).validate().is_err());
        assert!(DqnConfig::default().discount_factor(1.5).validate().is_err());
    }
}
