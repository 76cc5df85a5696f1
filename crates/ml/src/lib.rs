#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::cast_precision_loss)]
//! # ml
//!
//! Small, dependency-light building blocks for function approximation.
//!
//! Everything works on row-major 2-D [`Tensor`]s of shape `[rows, cols]`,
//! where each row is one sample. Layers implement an explicit backward pass
//! instead of a recorded tape, which keeps the whole crate synchronous and
//! easy to check against finite differences.
//!
//! -   [`tensor`]: the dense [`Tensor`] type.
//! -   [`nn`]: [`Dense`], activations, [`Sequential`] and the [`mlp`] builder.
//! -   [`optim`]: the [`Adam`] optimizer with persistent moment estimates.
//! -   [`dist`]: softmax helpers and the [`Categorical`] distribution.
//! -   [`loss`]: policy-gradient and mean-squared-error losses together with
//!     their gradients w.r.t. the network output.

pub mod dist;
pub mod loss;
pub mod nn;
pub mod optim;
pub mod tensor;

pub use dist::{log_softmax, softmax, Categorical};
pub use loss::{mse_loss, policy_gradient_loss};
pub use nn::{mlp, Activation, Dense, Layer, Relu, Sequential, TanhAct};
pub use optim::Adam;
pub use tensor::Tensor;
