//! Configuration of [`Trainer`](super::Trainer).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// Number of training episodes.
    pub n_episodes: usize,

    /// An episode is cut off after this number of steps.
    pub max_steps_per_episode: usize,

    /// Interval of logging the mean reward, in episodes.
    pub record_interval: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_episodes: 1000,
            max_steps_per_episode: usize::MAX,
            record_interval: 20,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of training episodes.
    pub fn n_episodes(mut self, v: usize) -> Self {
        self.n_episodes = v;
        self
    }

    /// Sets the maximum number of steps in an episode.
    pub fn max_steps_per_episode(mut self, v: usize) -> Self {
        self.max_steps_per_episode = v;
        self
    }

    /// Sets the interval of logging the mean reward.
    pub fn record_interval(mut self, v: usize) -> Self {
        self.record_interval = v;
        self
    }

    /// Loads [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        log::info!("Load config of trainer from {}", path_.to_str().unwrap_or("?"));
        Ok(b)
    }

    /// Saves [`TrainerConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        log::info!("Save config of trainer into {}", path_.to_str().unwrap_or("?"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_trainer_config() -> Result<()> {
        let config = TrainerConfig::default()
            .n_episodes(500)
            .max_steps_per_episode(200)
            .record_interval(10);

        let dir = TempDir::new("trainer_config")?;
        let path = dir.path().join("trainer_config.yaml");
        config.save(&path)?;
        let config_ = TrainerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
