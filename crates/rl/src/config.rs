//! Hyperparameters.
//!
//! [`Config`] is read-only once training starts. A JSON document only needs
//! to name the fields it changes; everything else keeps the value of the
//! preset (or [`Config::default`]) it is layered over.

use std::path::Path;

use anyhow::Context;
use gym::EnvId;
use ml::Activation;
use serde::{Deserialize, Serialize};

use crate::advantage::FROZEN_LAKE_4X4_BASELINE;
use crate::error::{Result, TrainError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub actor_learning_rate: f32,
    /// Critic learning rate is `actor_learning_rate * critic_to_actor_lr_ratio`.
    pub critic_to_actor_lr_ratio: f32,
    /// Critic updates per iteration, all on the same batch.
    pub critic_steps_per_iteration: usize,
    pub iterations: usize,
    pub steps_per_iteration: usize,
    pub max_episode_length: usize,
    pub discount_factor: f32,
    pub hidden_layer_count: usize,
    pub hidden_layer_size: usize,
    pub activation: Activation,
    pub use_fixed_baseline_override: bool,
    /// Per-state baseline table for the override; `None` means the FrozenLake
    /// 4x4 table.
    pub fixed_baseline: Option<Vec<f32>>,
    pub one_hot_encode_states: bool,
    pub enable_render: bool,
    pub render_delay_ms: u64,
    pub render_max_steps: usize,
    pub probe_interval: usize,
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            actor_learning_rate: 1e-3,
            critic_to_actor_lr_ratio: 10.0,
            critic_steps_per_iteration: 5,
            iterations: 5_000,
            steps_per_iteration: 200,
            max_episode_length: 100,
            discount_factor: 0.99,
            hidden_layer_count: 1,
            hidden_layer_size: 16,
            activation: Activation::Relu,
            use_fixed_baseline_override: false,
            fixed_baseline: None,
            one_hot_encode_states: true,
            enable_render: false,
            render_delay_ms: 250,
            render_max_steps: 100,
            probe_interval: 1_000,
            seed: 0,
        }
    }
}

impl Config {
    /// Per-environment defaults.
    #[must_use]
    pub fn preset(env: EnvId) -> Self {
        match env {
            EnvId::FrozenLake => Self::default(),
            EnvId::FrozenLake8x8 => Self {
                iterations: 10_000,
                steps_per_iteration: 500,
                max_episode_length: 200,
                hidden_layer_size: 32,
                ..Self::default()
            },
            EnvId::MountainCar => Self {
                actor_learning_rate: 3e-3,
                critic_to_actor_lr_ratio: 3.0,
                iterations: 300,
                steps_per_iteration: 5_000,
                max_episode_length: 1_000,
                discount_factor: 0.99,
                hidden_layer_count: 2,
                hidden_layer_size: 32,
                activation: Activation::Tanh,
                one_hot_encode_states: false,
                ..Self::default()
            },
        }
    }

    #[must_use]
    pub fn critic_learning_rate(&self) -> f32 {
        self.actor_learning_rate * self.critic_to_actor_lr_ratio
    }

    /// The table used by the fixed-baseline override.
    #[must_use]
    pub fn fixed_baseline_table(&self) -> Vec<f32> {
        self.fixed_baseline
            .clone()
            .unwrap_or_else(|| FROZEN_LAKE_4X4_BASELINE.to_vec())
    }

    /// Parses a JSON document over [`Config::default`].
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON or unknown fields.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Layers the JSON object in `json` over `self`.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON, a non-object document or unknown
    /// fields.
    pub fn merge_json_str(&self, json: &str) -> anyhow::Result<Self> {
        let overrides: serde_json::Value = serde_json::from_str(json)?;
        let serde_json::Value::Object(overrides) = overrides else {
            anyhow::bail!("configuration must be a JSON object");
        };
        let mut base = serde_json::to_value(self)?;
        if let serde_json::Value::Object(fields) = &mut base {
            fields.extend(overrides);
        }
        Ok(serde_json::from_value(base)?)
    }

    /// Reads `path` over [`Config::default`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        Self::default().merge_file(path)
    }

    /// Reads `path` and layers it over `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn merge_file(&self, path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        self.merge_json_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::Configuration`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(TrainError::Configuration(msg));
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return bad(format!("discount_factor {} outside [0, 1]", self.discount_factor));
        }
        if !(self.actor_learning_rate.is_finite() && self.actor_learning_rate > 0.0) {
            return bad(format!("actor_learning_rate {} must be positive", self.actor_learning_rate));
        }
        if !(self.critic_to_actor_lr_ratio.is_finite() && self.critic_to_actor_lr_ratio > 0.0) {
            return bad(format!(
                "critic_to_actor_lr_ratio {} must be positive",
                self.critic_to_actor_lr_ratio
            ));
        }
        if self.iterations == 0 {
            return bad("iterations must be at least 1".into());
        }
        if self.steps_per_iteration == 0 {
            return bad("steps_per_iteration must be at least 1".into());
        }
        if self.max_episode_length == 0 {
            return bad("max_episode_length must be at least 1".into());
        }
        if self.hidden_layer_count > 0 && self.hidden_layer_size == 0 {
            return bad("hidden_layer_size must be at least 1 when hidden layers are requested".into());
        }
        if self.probe_interval == 0 {
            return bad("probe_interval must be at least 1".into());
        }
        if self.render_max_steps == 0 {
            return bad("render_max_steps must be at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for id in EnvId::ALL {
            Config::preset(id).validate().unwrap();
        }
    }

    #[test]
    fn critic_rate_follows_ratio() {
        let cfg = Config { actor_learning_rate: 0.002, critic_to_actor_lr_ratio: 5.0, ..Config::default() };
        assert!((cfg.critic_learning_rate() - 0.01).abs() < 1e-7);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = Config::from_json_str(r#"{ "iterations": 3, "activation": "tanh" }"#).unwrap();
        assert_eq!(cfg.iterations, 3);
        assert_eq!(cfg.activation, Activation::Tanh);
        assert_eq!(cfg.steps_per_iteration, Config::default().steps_per_iteration);
    }

    #[test]
    fn merge_layers_over_a_preset() {
        let base = Config::preset(EnvId::MountainCar);
        let cfg = base.merge_json_str(r#"{ "seed": 9 }"#).unwrap();
        assert_eq!(cfg.seed, 9);
        assert_eq!(cfg.max_episode_length, base.max_episode_length);
        assert!(!cfg.one_hot_encode_states);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Config::from_json_str(r#"{ "gamma": 0.5 }"#).is_err());
        assert!(Config::default().merge_json_str("[1, 2]").is_err());
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        let cases = [
            Config { discount_factor: 1.5, ..Config::default() },
            Config { discount_factor: -0.1, ..Config::default() },
            Config { actor_learning_rate: 0.0, ..Config::default() },
            Config { critic_to_actor_lr_ratio: f32::NAN, ..Config::default() },
            Config { iterations: 0, ..Config::default() },
            Config { steps_per_iteration: 0, ..Config::default() },
            Config { max_episode_length: 0, ..Config::default() },
            Config { hidden_layer_size: 0, ..Config::default() },
            Config { probe_interval: 0, ..Config::default() },
        ];
        for cfg in cases {
            assert!(matches!(cfg.validate(), Err(TrainError::Configuration(_))), "{cfg:?}");
        }
    }

    #[test]
    fn default_baseline_table_has_sixteen_entries() {
        assert_eq!(Config::default().fixed_baseline_table().len(), 16);
    }
}
