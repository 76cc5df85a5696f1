//! Advantage estimation: return minus a baseline.

use ml::Tensor;

use crate::critic::Critic;
use crate::encoder::{ObservationKind, StateEncoder};
use crate::error::{ensure_finite, Result, TrainError};

/// Hand-tuned state values of the slippery 4x4 FrozenLake, indexed by state id.
pub const FROZEN_LAKE_4X4_BASELINE: [f32; 16] = [
    0.063, 0.056, 0.071, 0.052, 0.086, 0.0, 0.11, 0.0, 0.141, 0.244, 0.297, 0.0, 0.0, 0.378, 0.638, 0.0,
];

/// Known per-state values for a small discrete environment, used in place of
/// the critic when debugging.
///
/// The baseline of a one-hot observation is its dot product with the table,
/// so table index `i` must be discrete state `i`. [`FixedBaseline::check`]
/// verifies that against the encoder.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedBaseline {
    table: Vec<f32>,
}

impl FixedBaseline {
    #[must_use]
    pub fn new(table: Vec<f32>) -> Self {
        Self { table }
    }

    /// # Errors
    ///
    /// Returns [`TrainError::Configuration`] unless the encoder one-hot encodes
    /// exactly `table.len()` discrete states and the table is finite.
    pub fn check(&self, encoder: &StateEncoder) -> Result<()> {
        let ObservationKind::Discrete(n) = encoder.kind() else {
            return Err(TrainError::Configuration(
                "fixed baseline override needs a discrete observation space".into(),
            ));
        };
        if !encoder.is_one_hot() {
            return Err(TrainError::Configuration(
                "fixed baseline override needs one-hot state encoding".into(),
            ));
        }
        if n != self.table.len() {
            return Err(TrainError::Configuration(format!(
                "fixed baseline has {} entries but the environment has {n} states",
                self.table.len()
            )));
        }
        if self.table.iter().any(|v| !v.is_finite()) {
            return Err(TrainError::Configuration("fixed baseline contains a non-finite entry".into()));
        }
        Ok(())
    }

    /// `table · observation` for each row.
    ///
    /// # Panics
    ///
    /// Panics if the observation width differs from the table length.
    #[must_use]
    pub fn values(&self, observations: &Tensor) -> Vec<f32> {
        assert_eq!(observations.cols(), self.table.len());
        observations
            .iter_rows()
            .map(|row| row.iter().zip(&self.table).map(|(o, b)| o * b).sum())
            .collect()
    }
}

/// Where the baseline comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum Baseline {
    /// The critic's current estimate.
    Critic,
    /// A fixed table; the critic is neither consulted nor trained.
    Fixed(FixedBaseline),
}

impl Baseline {
    #[must_use]
    pub fn values(&self, observations: &Tensor, critic: &Critic) -> Vec<f32> {
        match self {
            Baseline::Critic => critic.approximate(observations),
            Baseline::Fixed(table) => table.values(observations),
        }
    }

    #[must_use]
    pub fn trains_critic(&self) -> bool {
        matches!(self, Baseline::Critic)
    }
}

/// `returns[i] - baseline(observations[i])`.
///
/// Callers pass the critic as it was before this iteration's critic update.
///
/// # Errors
///
/// Returns [`TrainError::NumericInstability`] if any advantage is not finite.
///
/// # Panics
///
/// Panics if `returns` and `observations` differ in length.
pub fn estimate_advantages(
    returns: &[f32],
    observations: &Tensor,
    baseline: &Baseline,
    critic: &Critic,
) -> Result<Vec<f32>> {
    assert_eq!(returns.len(), observations.rows());
    let values = baseline.values(observations, critic);
    let advantages: Vec<f32> = returns.iter().zip(&values).map(|(r, v)| r - v).collect();
    ensure_finite("advantages", &advantages)?;
    Ok(advantages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use gym::Space;

    fn one_hot(n: usize, idx: &[usize]) -> Tensor {
        let rows: Vec<Vec<f32>> = idx
            .iter()
            .map(|&i| {
                let mut v = vec![0.0; n];
                v[i] = 1.0;
                v
            })
            .collect();
        Tensor::from_rows(n, &rows)
    }

    #[test]
    fn fixed_baseline_is_table_lookup() {
        let fb = FixedBaseline::new(FROZEN_LAKE_4X4_BASELINE.to_vec());
        let obs = one_hot(16, &[0, 9, 14, 15]);
        assert_eq!(fb.values(&obs), vec![0.063, 0.244, 0.638, 0.0]);
    }

    #[test]
    fn fixed_baseline_advantages_ignore_the_critic() {
        let critic = Critic::new(16, &Config::default(), &mut fastrand::Rng::with_seed(0));
        let baseline = Baseline::Fixed(FixedBaseline::new(FROZEN_LAKE_4X4_BASELINE.to_vec()));
        let obs = one_hot(16, &[13, 14]);
        let adv = estimate_advantages(&[1.0, 1.0], &obs, &baseline, &critic).unwrap();
        assert!((adv[0] - (1.0 - 0.378)).abs() < 1e-6);
        assert!((adv[1] - (1.0 - 0.638)).abs() < 1e-6);
        assert!(!baseline.trains_critic());
    }

    #[test]
    fn critic_baseline_subtracts_estimates() {
        let critic = Critic::new(2, &Config::default(), &mut fastrand::Rng::with_seed(0));
        let obs = Tensor::from_rows(2, &[vec![0.1, 0.2], vec![-0.3, 0.4]]);
        let values = critic.approximate(&obs);
        let adv = estimate_advantages(&[1.0, 2.0], &obs, &Baseline::Critic, &critic).unwrap();
        assert!((adv[0] - (1.0 - values[0])).abs() < 1e-6);
        assert!((adv[1] - (2.0 - values[1])).abs() < 1e-6);
    }

    #[test]
    fn table_must_match_encoder() {
        let fb = FixedBaseline::new(FROZEN_LAKE_4X4_BASELINE.to_vec());
        assert!(fb.check(&StateEncoder::new(&Space::Discrete(16), true).unwrap()).is_ok());
        for enc in [
            StateEncoder::new(&Space::Discrete(16), false).unwrap(),
            StateEncoder::new(&Space::Discrete(64), true).unwrap(),
            StateEncoder::new(&Space::Box { shape: vec![16] }, true).unwrap(),
        ] {
            assert!(matches!(fb.check(&enc), Err(TrainError::Configuration(_))));
        }
    }

    #[test]
    fn non_finite_returns_are_fatal() {
        let critic = Critic::new(2, &Config::default(), &mut fastrand::Rng::with_seed(0));
        let obs = Tensor::from_rows(2, &[vec![0.0, 0.0]]);
        let err = estimate_advantages(&[f32::NAN], &obs, &Baseline::Critic, &critic).unwrap_err();
        assert!(matches!(err, TrainError::NumericInstability { stage: "advantages", .. }));
    }
}
