//! Configuration of [`LinearQNet`](super::LinearQNet).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`LinearQNet`](super::LinearQNet).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct LinearQNetConfig {
    /// Dimension of states.
    pub state_dim: usize,

    /// Number of actions.
    pub n_actions: usize,

    /// Step size of SGD.
    pub learning_rate: f32,

    /// Weights are initialized uniformly in `[-init_scale, init_scale]`.
    pub init_scale: f32,

    /// Random seed for initialization.
    pub seed: u64,
}

impl Default for LinearQNetConfig {
    fn default() -> Self {
        Self {
            state_dim: 25,
            n_actions: 5,
            learning_rate: 5e-4,
            init_scale: 0.01,
            seed: 42,
        }
    }
}

impl LinearQNetConfig {
    /// Sets the dimension of states.
    pub fn state_dim(mut self, v: usize) -> Self {
        self.state_dim = v;
        self
    }

    /// Sets the number of actions.
    pub fn n_actions(mut self, v: usize) -> Self {
        self.n_actions = v;
        self
    }

    /// Sets the learning rate.
    pub fn learning_rate(mut self, v: f32) -> Self {
        self.learning_rate = v;
        self
    }

    /// Sets the scale of initial weights.
    pub fn init_scale(mut self, v: f32) -> Self {
        self.init_scale = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Loads [`LinearQNetConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        log::info!("Load config of LinearQNet from {}", path_.to_str().unwrap_or("?"));
        Ok(b)
    }

    /// Saves [`LinearQNetConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        log::info!("Save config of LinearQNet into {}", path_.to_str().unwrap_or("?"));
        Ok(())
    }
}
