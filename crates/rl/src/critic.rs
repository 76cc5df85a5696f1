use ml::{mlp, mse_loss, Adam, Sequential, Tensor};
use tracing::debug;

use crate::config::Config;
use crate::error::{ensure_finite, Result};

/// State-value regressor used as the advantage baseline.
pub struct Critic {
    net: Sequential,
    optimizer: Adam,
    updates: usize,
}

impl Critic {
    /// Same hidden architecture as the actor, scalar output, learning rate
    /// `actor_learning_rate * critic_to_actor_lr_ratio`.
    #[must_use]
    pub fn new(input_dim: usize, config: &Config, rng: &mut fastrand::Rng) -> Self {
        let net = mlp(
            input_dim,
            1,
            config.hidden_layer_count,
            config.hidden_layer_size,
            config.activation,
            rng,
        );
        Self { net, optimizer: Adam::new(config.critic_learning_rate()), updates: 0 }
    }

    #[must_use]
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// `V(s)` for each row.
    #[must_use]
    pub fn approximate(&self, states: &Tensor) -> Vec<f32> {
        self.net.predict(states).into_column()
    }

    /// One Adam step on the mean squared error against `returns`. Returns the
    /// loss before the step.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TrainError::NumericInstability`] when the loss or a
    /// gradient is not finite; parameters are left untouched in that case.
    pub fn update(&mut self, states: &Tensor, returns: &[f32]) -> Result<f32> {
        let (pred, activations) = self.net.forward(states);
        let (loss, grad) = mse_loss(&pred, returns);
        ensure_finite("critic loss", &[loss])?;
        let (_, grads) = self.net.backward(&activations, &grad);
        for g in &grads {
            ensure_finite("critic gradient", &g.data)?;
        }
        let mut pairs: Vec<(&mut Tensor, &Tensor)> = self.net.params_mut().into_iter().zip(grads.iter()).collect();
        self.optimizer.step(&mut pairs);
        self.updates += 1;
        debug!(loss, rows = states.rows(), "critic update");
        Ok(loss)
    }
}
