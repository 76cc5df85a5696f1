//! Raw observation to feature vector.
//!
//! The observation space is inspected exactly once, in
//! [`ObservationKind::from_space`]; everything downstream works from the
//! resolved kind and the fixed feature width.

use gym::{Observation, Space};

use crate::error::{Result, TrainError};

/// Observation space resolved at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObservationKind {
    /// `n` discrete states.
    Discrete(usize),
    /// Real vector of length `dim`.
    Vector(usize),
}

impl ObservationKind {
    /// # Errors
    ///
    /// Returns [`TrainError::Configuration`] for an empty discrete space or a
    /// box space whose rank is not 1.
    pub fn from_space(space: &Space) -> Result<Self> {
        match space {
            Space::Discrete(0) => Err(TrainError::Configuration("discrete observation space is empty".into())),
            Space::Discrete(n) => Ok(ObservationKind::Discrete(*n)),
            Space::Box { shape } if shape.len() == 1 && shape[0] > 0 => Ok(ObservationKind::Vector(shape[0])),
            Space::Box { shape } => Err(TrainError::Configuration(format!(
                "observation space of shape {shape:?} is not supported; only rank-1 vectors are"
            ))),
        }
    }
}

/// Number of discrete actions.
///
/// # Errors
///
/// Returns [`TrainError::Configuration`] for continuous or empty action spaces.
pub fn action_dim(space: &Space) -> Result<usize> {
    match space {
        Space::Discrete(0) => Err(TrainError::Configuration("discrete action space is empty".into())),
        Space::Discrete(n) => Ok(*n),
        Space::Box { shape } => Err(TrainError::Configuration(format!(
            "continuous action space {shape:?} is not supported"
        ))),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Encoding {
    /// Unit basis vector of width `n`.
    OneHot(usize),
    /// The raw id as a single real. Treats state identity as ordinal, which
    /// is only an approximation.
    Ordinal(usize),
    /// Vector observations as-is.
    PassThrough(usize),
}

/// Maps observations to fixed-width feature vectors.
#[derive(Clone, Debug)]
pub struct StateEncoder {
    kind: ObservationKind,
    encoding: Encoding,
}

impl StateEncoder {
    /// `one_hot` only affects discrete spaces.
    ///
    /// # Errors
    ///
    /// Propagates [`ObservationKind::from_space`] failures.
    pub fn new(space: &Space, one_hot: bool) -> Result<Self> {
        let kind = ObservationKind::from_space(space)?;
        let encoding = match kind {
            ObservationKind::Discrete(n) if one_hot => Encoding::OneHot(n),
            ObservationKind::Discrete(n) => Encoding::Ordinal(n),
            ObservationKind::Vector(dim) => Encoding::PassThrough(dim),
        };
        Ok(Self { kind, encoding })
    }

    #[must_use]
    pub fn kind(&self) -> ObservationKind {
        self.kind
    }

    /// Feature width D.
    #[must_use]
    pub fn dim(&self) -> usize {
        match self.encoding {
            Encoding::OneHot(n) => n,
            Encoding::Ordinal(_) => 1,
            Encoding::PassThrough(dim) => dim,
        }
    }

    #[must_use]
    pub fn is_one_hot(&self) -> bool {
        matches!(self.encoding, Encoding::OneHot(_))
    }

    /// # Errors
    ///
    /// Returns [`TrainError::EnvironmentProtocol`] when the observation does
    /// not fit the space the encoder was built for.
    pub fn encode(&self, obs: &Observation) -> Result<Vec<f32>> {
        match (self.encoding, obs) {
            (Encoding::OneHot(n) | Encoding::Ordinal(n), Observation::Discrete(s)) => {
                self.encode_index(*s).ok_or_else(|| {
                    TrainError::EnvironmentProtocol(format!("state {s} outside discrete space of size {n}"))
                })
            }
            (Encoding::PassThrough(dim), Observation::Vector(v)) => {
                if v.len() != dim {
                    return Err(TrainError::EnvironmentProtocol(format!(
                        "observation of length {} where {dim} was expected",
                        v.len()
                    )));
                }
                if let Some(i) = v.iter().position(|x| !x.is_finite()) {
                    return Err(TrainError::EnvironmentProtocol(format!(
                        "observation component {i} is {}",
                        v[i]
                    )));
                }
                Ok(v.clone())
            }
            (_, other) => Err(TrainError::EnvironmentProtocol(format!(
                "observation {other:?} does not match {:?}",
                self.kind
            ))),
        }
    }

    /// Encodes discrete state `index`; `None` for vector spaces or an index
    /// out of range.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn encode_index(&self, index: usize) -> Option<Vec<f32>> {
        match self.encoding {
            Encoding::OneHot(n) if index < n => {
                let mut v = vec![0.0; n];
                v[index] = 1.0;
                Some(v)
            }
            Encoding::Ordinal(n) if index < n => Some(vec![index as f32]),
            _ => None,
        }
    }
}
