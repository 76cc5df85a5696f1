#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # gym
//!
//! The interactive-simulator contract used by the trainer, in the spirit of
//! OpenAI Gym, plus two small bundled environments:
//!
//! -   [`FrozenLake`]: a slippery grid world with a discrete observation
//!     space (16 or 64 states) and 4 actions.
//! -   [`MountainCar`]: the classic under-powered car with a 2-dimensional
//!     vector observation and 3 actions.
//!
//! Environments are built by name through [`EnvId`] and [`make`].

use std::collections::HashMap;
use thiserror::Error;

pub mod frozen_lake;
pub mod mountain_car;
mod registry;

pub use frozen_lake::FrozenLake;
pub use mountain_car::MountainCar;
pub use registry::{make, EnvId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GymError {
    #[error("action {action} outside the discrete action space of size {n}")]
    InvalidAction { action: usize, n: usize },
    #[error("step called before reset")]
    NotReset,
    #[error("environment does not support rendering")]
    RenderUnsupported,
    #[error("invalid map: {0}")]
    InvalidMap(String),
    #[error("unknown environment {0:?}")]
    UnknownEnv(String),
}

/// Shape of an observation or action space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Space {
    /// `n` integer ids `0..n`.
    Discrete(usize),
    /// Real-valued array with the given shape.
    Box { shape: Vec<usize> },
}

/// A raw observation as produced by an environment.
#[derive(Clone, Debug, PartialEq)]
pub enum Observation {
    Discrete(usize),
    Vector(Vec<f32>),
}

/// Auxiliary per-step diagnostics, keyed by name.
pub type Info = HashMap<String, f32>;

/// Result of one [`Env::step`].
#[derive(Clone, Debug)]
pub struct Step {
    pub observation: Observation,
    pub reward: f32,
    pub done: bool,
    pub info: Info,
}

/// Reinforcement learning environment with a discrete action space.
///
/// Each call to [`step`] advances the simulation by one action and returns
/// the new observation, a reward signal, and whether the episode has
/// terminated.
///
/// [`step`]: Env::step
pub trait Env {
    fn observation_space(&self) -> Space;

    fn action_space(&self) -> Space;

    /// Reset to a starting state and return the initial observation.
    fn reset(&mut self) -> Observation;

    /// Advance the environment by one action.
    ///
    /// # Errors
    ///
    /// Returns [`GymError::InvalidAction`] for an action outside the action
    /// space and [`GymError::NotReset`] when called before [`Env::reset`].
    fn step(&mut self, action: usize) -> Result<Step, GymError>;

    /// Human-readable picture of the current state.
    ///
    /// # Errors
    ///
    /// Environments without a text rendering return
    /// [`GymError::RenderUnsupported`].
    fn render(&self) -> Result<String, GymError> {
        Err(GymError::RenderUnsupported)
    }
}

impl<E: Env + ?Sized> Env for Box<E> {
    fn observation_space(&self) -> Space {
        (**self).observation_space()
    }

    fn action_space(&self) -> Space {
        (**self).action_space()
    }

    fn reset(&mut self) -> Observation {
        (**self).reset()
    }

    fn step(&mut self, action: usize) -> Result<Step, GymError> {
        (**self).step(action)
    }

    fn render(&self) -> Result<String, GymError> {
        (**self).render()
    }
}
