//! The training loop.
//!
//! Each iteration samples a batch with the current actor, computes returns
//! and advantages, takes `critic_steps_per_iteration` critic steps and then
//! one actor step. Advantages are computed before the critic moves, so the
//! actor is always trained against the critic that existed when the batch
//! was scored.

use std::thread;
use std::time::Duration;

use gym::Env;
use ml::Tensor;
use tracing::{debug, info, warn};

use crate::actor::Actor;
use crate::advantage::{estimate_advantages, Baseline, FixedBaseline};
use crate::config::Config;
use crate::critic::Critic;
use crate::encoder::{action_dim, ObservationKind, StateEncoder};
use crate::error::{ensure_finite, Result, TrainError};
use crate::returns::batch_returns;
use crate::sampler::{sample, SampleTarget};
use crate::stats::{EpisodeStats, IterationStats};
use crate::telemetry::Telemetry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Sampling,
    Updating,
    Reporting,
    Done,
}

/// Everything that changes while training.
///
/// The trainer is the only writer; nothing here is touched between the start
/// of sampling and the end of the actor update except by the trainer itself.
pub struct TrainerState {
    pub actor: Actor,
    pub critic: Critic,
    pub rng: fastrand::Rng,
    /// Iterations completed so far.
    pub iteration: usize,
    pub phase: Phase,
    last_episode_reward: Option<f32>,
    diagnostics: usize,
}

impl TrainerState {
    /// Reward of the most recent complete episode seen during training.
    #[must_use]
    pub fn last_episode_reward(&self) -> Option<f32> {
        self.last_episode_reward
    }

    /// Critic diagnostics that produced a value grid so far.
    #[must_use]
    pub fn diagnostics(&self) -> usize {
        self.diagnostics
    }
}

#[derive(Clone, Debug, Default)]
pub struct TrainingSummary {
    pub history: Vec<IterationStats>,
}

impl TrainingSummary {
    #[must_use]
    pub fn last(&self) -> Option<&IterationStats> {
        self.history.last()
    }
}

/// Result of [`Trainer::render_episode`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOutcome {
    pub steps: usize,
    pub total_reward: f32,
    /// `false` if `render_max_steps` ran out first.
    pub terminated: bool,
}

pub struct Trainer<E: Env> {
    env: E,
    config: Config,
    encoder: StateEncoder,
    baseline: Baseline,
    state: TrainerState,
    sinks: Vec<Box<dyn Telemetry>>,
}

impl<E: Env> Trainer<E> {
    /// Validates `config` against the environment's spaces and builds both
    /// networks.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::Configuration`] for invalid hyperparameters, an
    /// observation space that is neither discrete nor a rank-1 vector, a
    /// continuous action space, or a fixed baseline that does not fit the
    /// observation space. Nothing is built in that case.
    pub fn new(env: E, config: Config) -> Result<Self> {
        config.validate()?;
        let encoder = StateEncoder::new(&env.observation_space(), config.one_hot_encode_states)?;
        let actions = action_dim(&env.action_space())?;
        let baseline = if config.use_fixed_baseline_override {
            let fixed = FixedBaseline::new(config.fixed_baseline_table());
            fixed.check(&encoder)?;
            Baseline::Fixed(fixed)
        } else {
            Baseline::Critic
        };

        let mut rng = fastrand::Rng::with_seed(config.seed);
        let actor = Actor::new(encoder.dim(), actions, &config, &mut rng);
        let critic = Critic::new(encoder.dim(), &config, &mut rng);
        info!(
            input_dim = encoder.dim(),
            actions,
            fixed_baseline = !baseline.trains_critic(),
            "trainer ready"
        );

        Ok(Self {
            env,
            config,
            encoder,
            baseline,
            state: TrainerState {
                actor,
                critic,
                rng,
                iteration: 0,
                phase: Phase::Initializing,
                last_episode_reward: None,
                diagnostics: 0,
            },
            sinks: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_telemetry(mut self, sink: impl Telemetry + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn add_telemetry(&mut self, sink: Box<dyn Telemetry>) {
        self.sinks.push(sink);
    }

    #[must_use]
    pub fn state(&self) -> &TrainerState {
        &self.state
    }

    #[must_use]
    pub fn encoder(&self) -> &StateEncoder {
        &self.encoder
    }

    #[must_use]
    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// One full sample / update / report cycle.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::EnvironmentProtocol`] for a misbehaving
    /// environment and [`TrainError::NumericInstability`] when a return,
    /// advantage, loss or gradient is not finite. A failed iteration does not
    /// advance the iteration counter.
    pub fn run_iteration(&mut self) -> Result<IterationStats> {
        let t = self.state.iteration;

        self.state.phase = Phase::Sampling;
        let batch = sample(
            &mut self.env,
            &self.encoder,
            &self.state.actor,
            &mut self.state.rng,
            self.config.max_episode_length,
            SampleTarget::Steps(self.config.steps_per_iteration),
        )?;
        debug!(iteration = t, steps = batch.steps(), trajectories = batch.trajectories.len(), "sampled");

        self.state.phase = Phase::Updating;
        let observations = batch.observations();
        let actions = batch.actions();
        let returns = batch_returns(&batch, self.config.discount_factor);
        ensure_finite("returns", &returns)?;
        let advantages = estimate_advantages(&returns, &observations, &self.baseline, &self.state.critic)?;

        let mut critic_loss = None;
        if self.baseline.trains_critic() {
            for _ in 0..self.config.critic_steps_per_iteration {
                let loss = self.state.critic.update(&observations, &returns)?;
                critic_loss.get_or_insert(loss);
            }
        }
        let actor_loss = self.state.actor.update(&observations, &actions, &advantages)?;

        self.state.phase = Phase::Reporting;
        let completed = batch.episode_rewards();
        if let Some(&last) = completed.last() {
            self.state.last_episode_reward = Some(last);
        }
        let summary = EpisodeStats::from_rewards(&completed)
            .or_else(|| EpisodeStats::from_rewards(&batch.cut_rewards()));
        let (average, max, std_error) = summary.map_or((0.0, 0.0, 0.0), |s| (s.mean, s.max, s.std_error));
        info!("{t} Average reward: {average:.2} +/- {std_error:.2}");

        let stats = IterationStats {
            iteration: t,
            average_reward: average,
            max_reward: max,
            reward_std_error: std_error,
            eval_reward: self.state.last_episode_reward,
            episodes: completed.len(),
            steps: batch.steps(),
            critic_loss,
            actor_loss,
        };
        for sink in &mut self.sinks {
            if let Err(err) = sink.record(&stats) {
                warn!(error = %err, iteration = t, "telemetry sink failed");
            }
        }
        if (t + 1) % self.config.probe_interval == 0 {
            if let Some(values) = self.probe_critic() {
                self.state.diagnostics += 1;
                debug!(iteration = t, states = values.len(), "critic diagnostic");
            }
        }

        self.state.iteration += 1;
        Ok(stats)
    }

    /// Runs the remaining iterations up to `config.iterations`.
    ///
    /// # Errors
    ///
    /// Stops at the first failing iteration; see [`Trainer::run_iteration`].
    pub fn train(&mut self) -> Result<TrainingSummary> {
        let mut summary = TrainingSummary::default();
        while self.state.iteration < self.config.iterations {
            summary.history.push(self.run_iteration()?);
        }
        self.state.phase = Phase::Done;
        info!("Training done.");
        Ok(summary)
    }

    /// Trains, then renders one episode if `enable_render` is set. Render
    /// failures are logged and ignored.
    ///
    /// # Errors
    ///
    /// See [`Trainer::train`].
    pub fn run(&mut self) -> Result<TrainingSummary> {
        let summary = self.train()?;
        if self.config.enable_render {
            if let Err(err) = self.render_episode() {
                warn!(error = %err, "rendering failed");
            }
        }
        Ok(summary)
    }

    /// Plays `num_episodes` complete episodes with the current policy and
    /// summarises their rewards. Parameters are not changed.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::Configuration`] for zero episodes and propagates
    /// sampling errors.
    pub fn evaluate(&mut self, num_episodes: usize) -> Result<EpisodeStats> {
        if num_episodes == 0 {
            return Err(TrainError::Configuration("evaluation needs at least one episode".into()));
        }
        let batch = sample(
            &mut self.env,
            &self.encoder,
            &self.state.actor,
            &mut self.state.rng,
            self.config.max_episode_length,
            SampleTarget::Episodes(num_episodes),
        )?;
        let rewards = batch.episode_rewards();
        let stats = EpisodeStats::from_rewards(&rewards)
            .ok_or_else(|| TrainError::EnvironmentProtocol("evaluation produced no episodes".into()))?;
        info!("Average reward: {:.2} +/- {:.2}", stats.mean, stats.std_error);
        Ok(stats)
    }

    /// Plays one episode for a human, logging each rendered frame.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::EnvironmentProtocol`] if the environment cannot
    /// render or step.
    pub fn render_episode(&mut self) -> Result<RenderOutcome> {
        let delay = Duration::from_millis(self.config.render_delay_ms);
        let mut obs = self.env.reset();
        let mut outcome = RenderOutcome { steps: 0, total_reward: 0.0, terminated: false };

        for _ in 0..self.config.render_max_steps {
            let frame = self.env.render()?;
            info!(state = ?obs, "\n{frame}");
            thread::sleep(delay);
            let state = self.encoder.encode(&obs)?;
            let action = self.state.actor.sample(&Tensor::row_vector(state), &mut self.state.rng)[0];
            let step = self.env.step(action)?;
            outcome.steps += 1;
            outcome.total_reward += step.reward;
            obs = step.observation;
            if step.done {
                outcome.terminated = true;
                break;
            }
        }
        let frame = self.env.render()?;
        info!(state = ?obs, "\n{frame}");

        if outcome.terminated {
            info!("Episode reward: {:.2}", outcome.total_reward);
        } else {
            info!("No terminal state reached after {} steps", outcome.steps);
        }
        Ok(outcome)
    }

    /// Critic values for every discrete state, logged as a grid. `None` for
    /// vector observations.
    #[must_use]
    pub fn probe_critic(&self) -> Option<Vec<f32>> {
        let ObservationKind::Discrete(n) = self.encoder.kind() else {
            return None;
        };
        let rows: Vec<Vec<f32>> = (0..n).filter_map(|i| self.encoder.encode_index(i)).collect();
        let values = self.state.critic.approximate(&Tensor::from_rows(self.encoder.dim(), &rows));
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            warn!(state = index, "critic probe produced a non-finite value");
        }
        for row in values.chunks(grid_width(n)) {
            let line: Vec<String> = row.iter().map(|v| format!("{v:.3}")).collect();
            info!("{}", line.join(" "));
        }
        Some(values)
    }
}

/// `⌊√n⌋`, at least 1.
fn grid_width(n: usize) -> usize {
    let mut w = 1;
    while (w + 1) * (w + 1) <= n {
        w += 1;
    }
    w
}
