//! Per-iteration sinks.
//!
//! A failing sink never stops training; the trainer logs the error and moves
//! on.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::stats::IterationStats;

pub trait Telemetry {
    /// # Errors
    ///
    /// Implementations report I/O or serialization failures.
    fn record(&mut self, stats: &IterationStats) -> anyhow::Result<()>;
}

/// Emits each record as a structured `tracing` event.
#[derive(Debug, Default)]
pub struct LogTelemetry;

impl Telemetry for LogTelemetry {
    fn record(&mut self, stats: &IterationStats) -> anyhow::Result<()> {
        info!(
            iteration = stats.iteration,
            average_reward = stats.average_reward,
            max_reward = stats.max_reward,
            std_error = stats.reward_std_error,
            eval_reward = ?stats.eval_reward,
            episodes = stats.episodes,
            steps = stats.steps,
            critic_loss = ?stats.critic_loss,
            actor_loss = stats.actor_loss,
            "iteration stats"
        );
        Ok(())
    }
}

/// One JSON object per line.
pub struct JsonLinesTelemetry<W: Write> {
    out: W,
}

impl JsonLinesTelemetry<BufWriter<File>> {
    /// Creates (or truncates) `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesTelemetry<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Telemetry for JsonLinesTelemetry<W> {
    fn record(&mut self, stats: &IterationStats) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.out, stats)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}
