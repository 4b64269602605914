//! This module is used for tests.
use crate::{
    base::{CriticLoss, Env, FitBatch, QNetwork, Step},
    record::Record,
};
use anyhow::{bail, Result};
use std::cell::Cell;

/// Dummy action-value function ignoring states.
///
/// It holds one value per action and moves the value of each sampled action
/// toward its target with a fixed step size. Calls to
/// [`QNetwork::predict`] and [`QNetwork::fit_batch`] are counted.
#[derive(Debug, Clone)]
pub struct DummyQNet {
    values: Vec<f32>,
    learning_rate: f32,
    fail: bool,
    n_predict: Cell<usize>,
    n_fit: usize,
}

impl DummyQNet {
    /// Constructs a network with zero values.
    pub fn new(n_actions: usize) -> Self {
        Self::with_values(vec![0.0; n_actions])
    }

    /// Constructs a network with the given values.
    pub fn with_values(values: Vec<f32>) -> Self {
        Self {
            values,
            learning_rate: 0.1,
            fail: false,
            n_predict: Cell::new(0),
            n_fit: 0,
        }
    }

    /// Makes every call to `predict` and `fit_batch` fail.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Action values.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of calls to `predict`.
    pub fn n_predict(&self) -> usize {
        self.n_predict.get()
    }

    /// Number of calls to `fit_batch`.
    pub fn n_fit(&self) -> usize {
        self.n_fit
    }
}

impl QNetwork for DummyQNet {
    type Params = Vec<f32>;

    fn n_actions(&self) -> usize {
        self.values.len()
    }

    fn predict(&self, states: &[&[f32]]) -> Result<Vec<Vec<f32>>> {
        self.n_predict.set(self.n_predict.get() + 1);
        if self.fail {
            bail!("predict failed");
        }
        Ok(states.iter().map(|_| self.values.clone()).collect())
    }

    fn fit_batch(&mut self, batch: FitBatch<'_>) -> Result<f32> {
        self.n_fit += 1;
        if self.fail {
            bail!("fit_batch failed");
        }

        let n = batch.actions.len() as f32;
        let mut grads = vec![0f32; self.values.len()];
        let mut loss = 0f32;
        for (i, (&a, &y)) in batch.actions.iter().zip(batch.targets.iter()).enumerate() {
            let w = batch.weights.map_or(1.0, |ws| ws[i]);
            let d = self.values[a] - y;
            loss += w * match batch.loss {
                CriticLoss::Mse => d * d,
                CriticLoss::SmoothL1 if d.abs() < 1.0 => 0.5 * d * d,
                CriticLoss::SmoothL1 => d.abs() - 0.5,
            };
            grads[a] += w * d;
        }
        for (v, g) in self.values.iter_mut().zip(grads.iter()) {
            *v -= self.learning_rate * g / n;
        }
        Ok(loss / n)
    }

    fn get_parameters(&self) -> Vec<f32> {
        self.values.clone()
    }

    fn set_parameters(&mut self, params: Vec<f32>) -> Result<()> {
        if params.len() != self.values.len() {
            bail!(
                "expected {} parameters, got {}",
                self.values.len(),
                params.len()
            );
        }
        self.values = params;
        Ok(())
    }
}

/// Configuration of [`DummyEnv`].
#[derive(Debug, Clone)]
pub struct DummyEnvConfig {
    /// Dimension of states.
    pub state_dim: usize,

    /// Number of actions.
    pub n_actions: usize,

    /// Number of steps in an episode.
    pub episode_len: usize,

    /// Action giving reward 1, all others give 0.
    pub best_action: usize,
}

/// Dummy environment where one action is always rewarded.
///
/// The first component of the state is the elapsed fraction of the episode,
/// the others are zero.
#[derive(Debug, Clone)]
pub struct DummyEnv {
    config: DummyEnvConfig,
    t: usize,
}

impl DummyEnv {
    fn state(&self) -> Vec<f32> {
        let mut state = vec![0f32; self.config.state_dim];
        if let Some(s) = state.first_mut() {
            *s = self.t as f32 / self.config.episode_len as f32;
        }
        state
    }
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        if config.best_action >= config.n_actions || config.episode_len == 0 {
            bail!("invalid config of DummyEnv: {:?}", config);
        }
        Ok(Self {
            config: config.clone(),
            t: 0,
        })
    }

    fn reset(&mut self) -> Result<Vec<f32>> {
        self.t = 0;
        Ok(self.state())
    }

    fn step(&mut self, act: usize) -> Result<Step> {
        if act >= self.config.n_actions {
            bail!("action {} out of range 0..{}", act, self.config.n_actions);
        }
        self.t += 1;
        let reward = if act == self.config.best_action { 1.0 } else { 0.0 };
        let done = self.t >= self.config.episode_len;
        Ok(Step::new(act, self.state(), reward, done, Record::empty()))
    }

    fn n_actions(&self) -> usize {
        self.config.n_actions
    }
}
