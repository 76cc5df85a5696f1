#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::cast_precision_loss)]
//! # rl
//!
//! Batch actor-critic policy gradient for environments with a discrete
//! action set.
//!
//! A [`Trainer`] owns an environment, an [`Actor`] (softmax policy) and a
//! [`Critic`] (state-value regressor). Every iteration it
//!
//! 1.  collects at least `steps_per_iteration` steps with the current policy
//!     ([`sampler`]),
//! 2.  computes discounted returns per episode ([`returns`]),
//! 3.  subtracts a baseline from the pre-update critic, or from a fixed
//!     table ([`advantage`]),
//! 4.  fits the critic to the returns, then takes one policy-gradient step
//!     on the actor,
//! 5.  reports episode statistics to its [`Telemetry`] sinks.
//!
//! Everything runs synchronously on one thread; all randomness comes from a
//! single seeded [`fastrand::Rng`].

pub mod actor;
pub mod advantage;
pub mod config;
pub mod critic;
pub mod encoder;
pub mod error;
pub mod returns;
pub mod sampler;
pub mod stats;
pub mod telemetry;
pub mod trainer;

pub use actor::Actor;
pub use advantage::{estimate_advantages, Baseline, FixedBaseline, FROZEN_LAKE_4X4_BASELINE};
pub use config::Config;
pub use critic::Critic;
pub use encoder::{action_dim, ObservationKind, StateEncoder};
pub use error::{Result, TrainError};
pub use returns::{batch_returns, discounted_returns};
pub use sampler::{sample, Batch, EpisodeEnd, SampleTarget, Trajectory};
pub use stats::{EpisodeStats, IterationStats};
pub use telemetry::{JsonLinesTelemetry, LogTelemetry, Telemetry};
pub use trainer::{Phase, RenderOutcome, Trainer, TrainerState, TrainingSummary};
