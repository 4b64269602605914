//! Linear action-value function.
use super::LinearQNetConfig;
use anyhow::{bail, Result};
use highway_core::{CriticLoss, FitBatch, QNetwork};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Parameters of [`LinearQNet`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LinearParams {
    /// Weights, one row of length `state_dim` per action.
    pub w: Vec<Vec<f32>>,

    /// Biases, one per action.
    pub b: Vec<f32>,
}

impl LinearParams {
    fn check_shape(&self, state_dim: usize, n_actions: usize) -> Result<()> {
        if self.b.len() != n_actions
            || self.w.len() != n_actions
            || self.w.iter().any(|row| row.len() != state_dim)
        {
            bail!(
                "parameters do not match state_dim={} and n_actions={}",
                state_dim,
                n_actions
            );
        }
        Ok(())
    }
}

/// Linear action-value function trained with SGD.
#[derive(Clone, Debug)]
pub struct LinearQNet {
    state_dim: usize,
    learning_rate: f32,
    params: LinearParams,
}

impl LinearQNet {
    /// Constructs a network with random weights and zero biases.
    pub fn build(config: &LinearQNetConfig) -> Result<Self> {
        if config.state_dim == 0 || config.n_actions == 0 {
            bail!("state_dim and n_actions must be positive: {:?}", config);
        }
        if !(config.learning_rate > 0.0 && config.learning_rate.is_finite()) {
            bail!("learning_rate must be positive: {}", config.learning_rate);
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let scale = config.init_scale.abs();
        let w = (0..config.n_actions)
            .map(|_| {
                (0..config.state_dim)
                    .map(|_| if scale > 0.0 { rng.gen_range(-scale..scale) } else { 0.0 })
                    .collect()
            })
            .collect();
        log::info!(
            "Build LinearQNet with state_dim={}, n_actions={}",
            config.state_dim,
            config.n_actions
        );

        Ok(Self {
            state_dim: config.state_dim,
            learning_rate: config.learning_rate,
            params: LinearParams {
                w,
                b: vec![0.0; config.n_actions],
            },
        })
    }

    /// Parameters.
    pub fn params(&self) -> &LinearParams {
        &self.params
    }

    fn check_state(&self, s: &[f32]) -> Result<()> {
        if s.len() != self.state_dim {
            bail!("expected a state of dimension {}, got {}", self.state_dim, s.len());
        }
        Ok(())
    }

    fn q(&self, s: &[f32], a: usize) -> f32 {
        let w = &self.params.w[a];
        w.iter().zip(s.iter()).map(|(w, x)| w * x).sum::<f32>() + self.params.b[a]
    }
}

impl QNetwork for LinearQNet {
    type Params = LinearParams;

    fn n_actions(&self) -> usize {
        self.params.b.len()
    }

    fn predict(&self, states: &[&[f32]]) -> Result<Vec<Vec<f32>>> {
        states
            .iter()
            .map(|s| -> Result<Vec<f32>> {
                self.check_state(s)?;
                Ok((0..self.n_actions()).map(|a| self.q(s, a)).collect())
            })
            .collect()
    }

    /// One SGD step on the mean of the (weighted) per-sample losses.
    fn fit_batch(&mut self, batch: FitBatch<'_>) -> Result<f32> {
        let n = batch.states.len();
        if n == 0 {
            bail!("empty batch");
        }
        if batch.actions.len() != n || batch.targets.len() != n {
            bail!(
                "batch size mismatch: {} states, {} actions, {} targets",
                n,
                batch.actions.len(),
                batch.targets.len()
            );
        }
        if let Some(ws) = batch.weights {
            if ws.len() != n {
                bail!("batch size mismatch: {} states, {} weights", n, ws.len());
            }
        }

        let n_actions = self.n_actions();
        let mut grad_w = vec![vec![0f32; self.state_dim]; n_actions];
        let mut grad_b = vec![0f32; n_actions];
        let mut loss = 0f32;

        for i in 0..n {
            let (s, a, y) = (batch.states[i], batch.actions[i], batch.targets[i]);
            self.check_state(s)?;
            if a >= n_actions {
                bail!("action {} out of range 0..{}", a, n_actions);
            }
            let weight = batch.weights.map_or(1.0, |ws| ws[i]);

            // Loss and its derivative with respect to Q(s, a)
            let d = self.q(s, a) - y;
            let (l, g) = match batch.loss {
                CriticLoss::Mse => (d * d, 2.0 * d),
                CriticLoss::SmoothL1 if d.abs() < 1.0 => (0.5 * d * d, d),
                CriticLoss::SmoothL1 => (d.abs() - 0.5, d.signum()),
            };
            loss += weight * l;

            let g = weight * g;
            for (gw, x) in grad_w[a].iter_mut().zip(s.iter()) {
                *gw += g * x;
            }
            grad_b[a] += g;
        }

        let lr = self.learning_rate / n as f32;
        for (w, gw) in self.params.w.iter_mut().zip(grad_w.iter()) {
            for (w, g) in w.iter_mut().zip(gw.iter()) {
                *w -= lr * g;
            }
        }
        for (b, g) in self.params.b.iter_mut().zip(grad_b.iter()) {
            *b -= lr * g;
        }

        let loss = loss / n as f32;
        log::trace!("LinearQNet loss: {}", loss);
        Ok(loss)
    }

    fn get_parameters(&self) -> LinearParams {
        self.params.clone()
    }

    fn set_parameters(&mut self, params: LinearParams) -> Result<()> {
        params.check_shape(self.state_dim, self.n_actions())?;
        self.params = params;
        Ok(())
    }
}
