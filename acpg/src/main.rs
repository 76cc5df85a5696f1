//! # acpg
//!
//! Trains a stochastic softmax policy with batch actor-critic policy
//! gradient on one of the bundled environments.
//!
//! ```text
//! acpg --env FrozenLake-v0 --iterations 2000 --telemetry run.jsonl
//! acpg --env MountainCar-v0 --config tuned.json --render
//! ```

mod app;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use gym::EnvId;

#[derive(Parser, Debug)]
#[command(version, about = "Batch actor-critic policy gradient")]
pub struct Args {
    /// Environment to train on.
    #[arg(long, default_value = "FrozenLake-v0")]
    pub env: EnvId,

    /// JSON file layered over the environment's preset.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub iterations: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Render one episode after training.
    #[arg(long)]
    pub render: bool,

    /// Write one JSON object per iteration to this file.
    #[arg(long)]
    pub telemetry: Option<PathBuf>,

    /// Play this many episodes after training and report the mean reward.
    #[arg(long)]
    pub evaluate: Option<usize>,
}

fn main() -> Result<()> {
    app::run(&Args::parse())
}
