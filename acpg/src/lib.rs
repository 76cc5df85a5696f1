//! # acpg: Actor-Critic Policy Gradient
//!
//! A small, synchronous reinforcement-learning trainer for environments with
//! a discrete action set.
//!
//! ## Overview
//!
//! The agent is a stochastic softmax policy (the actor) trained with a
//! Monte-Carlo policy gradient whose variance is reduced by a learned state
//! value (the critic). Training proceeds in iterations: collect a batch of
//! whole episodes with the current policy, compute discounted returns,
//! subtract the critic's estimate to obtain advantages, fit the critic to the
//! returns a few times, then take one gradient step on the actor.
//!
//! ## The Crates
//!
//! -   **`acpg`:** The crate you are currently viewing. It is the
//!     documentation entry point and the command-line binary, which sets up
//!     logging, layers configuration and runs the trainer.
//! -   **[`rl`]:** Configuration, state encoding, the actor and critic, the
//!     trajectory sampler, return and advantage computation, the training
//!     loop and its telemetry sinks.
//! -   **[`gym`]:** The environment contract and two bundled environments,
//!     FrozenLake and MountainCar.
//! -   **[`ml`]:** Tensors, dense layers with explicit backward passes, the
//!     Adam optimizer, softmax helpers and losses.
//!
//! ## Getting Started
//!
//! ```text
//! cargo run --release -p acpg -- --env FrozenLake-v0 --iterations 2000
//! ```
//!
//! Pass `--config file.json` to override any field of [`rl::Config`]; fields
//! not named in the file keep the environment's preset.

pub use gym;
pub use ml;
pub use rl;
