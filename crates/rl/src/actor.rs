use ml::{mlp, policy_gradient_loss, Adam, Categorical, Sequential, Tensor};
use tracing::debug;

use crate::config::Config;
use crate::error::{ensure_finite, Result};

/// Stochastic softmax policy over a discrete action set.
///
/// Owns its parameters and its Adam state; both change only through
/// [`Actor::update`].
pub struct Actor {
    net: Sequential,
    optimizer: Adam,
    action_dim: usize,
    updates: usize,
}

impl Actor {
    #[must_use]
    pub fn new(input_dim: usize, action_dim: usize, config: &Config, rng: &mut fastrand::Rng) -> Self {
        let net = mlp(
            input_dim,
            action_dim,
            config.hidden_layer_count,
            config.hidden_layer_size,
            config.activation,
            rng,
        );
        Self { net, optimizer: Adam::new(config.actor_learning_rate), action_dim, updates: 0 }
    }

    #[must_use]
    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    /// Number of completed [`Actor::update`] calls.
    #[must_use]
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// Unnormalised action scores, `[rows, action_dim]`.
    #[must_use]
    pub fn scores(&self, states: &Tensor) -> Tensor {
        self.net.predict(states)
    }

    /// One action per row drawn from `softmax(scores)`. There is no greedy
    /// mode.
    pub fn sample(&self, states: &Tensor, rng: &mut fastrand::Rng) -> Vec<usize> {
        let logits = self.scores(states);
        Categorical::new(&logits).sample(rng)
    }

    #[must_use]
    pub fn log_prob(&self, states: &Tensor, actions: &[usize]) -> Vec<f32> {
        let logits = self.scores(states);
        Categorical::new(&logits).log_prob(actions)
    }

    /// One Adam step on `-Σ log π(a|s) · advantage`. Returns the loss before
    /// the step.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TrainError::NumericInstability`] when the loss or a
    /// gradient is not finite; parameters are left untouched in that case.
    ///
    /// # Panics
    ///
    /// Panics if `actions` or `advantages` are not one per state row.
    pub fn update(&mut self, states: &Tensor, actions: &[usize], advantages: &[f32]) -> Result<f32> {
        let (logits, activations) = self.net.forward(states);
        let (loss, grad) = policy_gradient_loss(&logits, actions, advantages);
        ensure_finite("actor loss", &[loss])?;
        let (_, grads) = self.net.backward(&activations, &grad);
        for g in &grads {
            ensure_finite("actor gradient", &g.data)?;
        }
        let mut pairs: Vec<(&mut Tensor, &Tensor)> = self.net.params_mut().into_iter().zip(grads.iter()).collect();
        self.optimizer.step(&mut pairs);
        self.updates += 1;
        debug!(loss, rows = states.rows(), "actor update");
        Ok(loss)
    }
}
