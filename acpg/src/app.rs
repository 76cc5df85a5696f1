//! Wires the command line to the trainer: logging, configuration layering,
//! environment construction and telemetry sinks.

use anyhow::{Context, Result};
use gym::make;
use rl::{Config, JsonLinesTelemetry, LogTelemetry, Trainer};

use crate::Args;

/// Preset for the chosen environment, then the config file, then flags.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed.
pub fn build_config(args: &Args) -> Result<Config> {
    let mut config = Config::preset(args.env);
    if let Some(path) = &args.config {
        config = config.merge_file(path)?;
    }
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.render {
        config.enable_render = true;
    }
    Ok(config)
}

/// Runs one training session.
///
/// # Errors
///
/// Returns configuration, I/O and training errors; they are also logged.
pub fn run(args: &Args) -> Result<()> {
    tracing_subscriber::fmt::init();

    let result = train(args);
    if let Err(e) = &result {
        tracing::error!("Training aborted: {e:#}");
    }
    result
}

fn train(args: &Args) -> Result<()> {
    let config = build_config(args)?;
    tracing::info!("Training on {} with {:?}", args.env, config);

    let env = make(args.env, config.seed);
    let mut trainer = Trainer::new(env, config)
        .with_context(|| format!("setting up {}", args.env))?
        .with_telemetry(LogTelemetry);
    if let Some(path) = &args.telemetry {
        let sink = JsonLinesTelemetry::create(path)?;
        trainer.add_telemetry(Box::new(sink));
    }

    let summary = trainer.run()?;
    if let Some(last) = summary.last() {
        tracing::info!(
            "Finished after {} iterations, last average reward {:.2}",
            summary.history.len(),
            last.average_reward
        );
    }

    if let Some(episodes) = args.evaluate {
        trainer.evaluate(episodes)?;
    }
    Ok(())
}
