use gym::GymError;
use thiserror::Error;

/// Failures of the training pipeline.
#[derive(Error, Debug)]
pub enum TrainError {
    /// Invalid hyperparameters or an unsupported space, raised before any
    /// training happens.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The environment produced a malformed observation, reward or step.
    #[error("environment protocol error: {0}")]
    EnvironmentProtocol(String),
    /// A non-finite value showed up in `stage`.
    #[error("non-finite value {value} in {stage} at index {index}")]
    NumericInstability { stage: &'static str, index: usize, value: f32 },
}

impl From<GymError> for TrainError {
    fn from(err: GymError) -> Self {
        TrainError::EnvironmentProtocol(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrainError>;

/// Fails with [`TrainError::NumericInstability`] on the first NaN or infinity.
pub(crate) fn ensure_finite(stage: &'static str, values: &[f32]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(TrainError::NumericInstability { stage, index, value: values[index] }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_values_pass() {
        assert!(ensure_finite("returns", &[0.0, -1.5, 1e30]).is_ok());
    }

    #[test]
    fn first_bad_value_is_reported() {
        let err = ensure_finite("advantages", &[1.0, f32::INFINITY, f32::NAN]).unwrap_err();
        match err {
            TrainError::NumericInstability { stage, index, value } => {
                assert_eq!(stage, "advantages");
                assert_eq!(index, 1);
                assert!(value.is_infinite());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn gym_errors_are_protocol_errors() {
        let err: TrainError = GymError::InvalidAction { action: 9, n: 4 }.into();
        assert!(matches!(err, TrainError::EnvironmentProtocol(_)));
    }
}
