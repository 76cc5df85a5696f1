//! Trajectory collection.
//!
//! The sampler drives environment, encoder and actor for whole episodes.
//! The actor is borrowed immutably for the entire call, so every step of a
//! batch is drawn from one parameter snapshot.

use gym::{Env, Step};
use ml::Tensor;
use tracing::debug;

use crate::actor::Actor;
use crate::encoder::StateEncoder;
use crate::error::{Result, TrainError};

/// How much experience to collect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleTarget {
    /// Batch mode: stop once at least this many steps were taken. The
    /// episode in progress when the budget is reached is cut there and no
    /// further episode starts.
    Steps(usize),
    /// Exactly this many complete episodes, however long they run.
    Episodes(usize),
}

/// Why a trajectory stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpisodeEnd {
    /// The environment signalled `done`.
    Terminal,
    /// `max_episode_length` steps were taken.
    LengthCap,
    /// The batch step budget ran out mid-episode.
    BudgetExhausted,
}

/// One episode: aligned encoded states, actions and rewards.
#[derive(Clone, Debug)]
pub struct Trajectory {
    pub states: Vec<Vec<f32>>,
    pub actions: Vec<usize>,
    pub rewards: Vec<f32>,
    pub end: EpisodeEnd,
}

impl Trajectory {
    fn new() -> Self {
        Self { states: Vec::new(), actions: Vec::new(), rewards: Vec::new(), end: EpisodeEnd::LengthCap }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    #[must_use]
    pub fn total_reward(&self) -> f32 {
        self.rewards.iter().sum()
    }

    /// Terminal or length-capped, i.e. not cut by the step budget.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.end != EpisodeEnd::BudgetExhausted
    }
}

/// Trajectories gathered in one call, in collection order.
///
/// Every flattening accessor concatenates trajectories in the same order, so
/// index `i` names the same timestep in all of them.
#[derive(Clone, Debug)]
pub struct Batch {
    pub trajectories: Vec<Trajectory>,
    obs_dim: usize,
}

impl Batch {
    /// Total steps across all trajectories.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.trajectories.iter().map(Trajectory::len).sum()
    }

    #[must_use]
    pub fn observations(&self) -> Tensor {
        let rows: Vec<&Vec<f32>> = self.trajectories.iter().flat_map(|t| &t.states).collect();
        Tensor::from_rows(self.obs_dim, &rows)
    }

    #[must_use]
    pub fn actions(&self) -> Vec<usize> {
        self.trajectories.iter().flat_map(|t| t.actions.iter().copied()).collect()
    }

    #[must_use]
    pub fn rewards(&self) -> Vec<f32> {
        self.trajectories.iter().flat_map(|t| t.rewards.iter().copied()).collect()
    }

    /// Total reward of every complete episode.
    #[must_use]
    pub fn episode_rewards(&self) -> Vec<f32> {
        self.trajectories
            .iter()
            .filter(|t| t.is_complete())
            .map(Trajectory::total_reward)
            .collect()
    }

    /// Partial reward of trajectories cut by the step budget.
    #[must_use]
    pub fn cut_rewards(&self) -> Vec<f32> {
        self.trajectories
            .iter()
            .filter(|t| !t.is_complete())
            .map(Trajectory::total_reward)
            .collect()
    }
}

/// Collects experience with the current policy.
///
/// # Errors
///
/// Returns [`TrainError::Configuration`] for a zero `max_episode_length` and
/// [`TrainError::EnvironmentProtocol`] for malformed observations, rejected
/// actions or non-finite rewards.
pub fn sample<E: Env + ?Sized>(
    env: &mut E,
    encoder: &StateEncoder,
    actor: &Actor,
    rng: &mut fastrand::Rng,
    max_episode_length: usize,
    target: SampleTarget,
) -> Result<Batch> {
    if max_episode_length == 0 {
        return Err(TrainError::Configuration("max_episode_length must be at least 1".into()));
    }
    let mut trajectories = Vec::new();
    let mut steps = 0usize;

    loop {
        let satisfied = match target {
            SampleTarget::Steps(n) => steps >= n,
            SampleTarget::Episodes(n) => trajectories.len() >= n,
        };
        if satisfied {
            break;
        }

        let mut obs = env.reset();
        let mut traj = Trajectory::new();
        for step in 0..max_episode_length {
            let state = encoder.encode(&obs)?;
            let action = actor.sample(&Tensor::row_vector(state.clone()), rng)[0];
            let Step { observation, reward, done, .. } = env.step(action)?;
            if !reward.is_finite() {
                return Err(TrainError::EnvironmentProtocol(format!("reward {reward} is not finite")));
            }
            traj.states.push(state);
            traj.actions.push(action);
            traj.rewards.push(reward);
            steps += 1;

            if done {
                traj.end = EpisodeEnd::Terminal;
                break;
            }
            if step + 1 == max_episode_length {
                traj.end = EpisodeEnd::LengthCap;
                break;
            }
            if target == SampleTarget::Steps(steps) {
                traj.end = EpisodeEnd::BudgetExhausted;
                break;
            }
            obs = observation;
        }
        debug!(len = traj.len(), end = ?traj.end, reward = traj.total_reward(), "episode");
        trajectories.push(traj);
    }

    Ok(Batch { trajectories, obs_dim: encoder.dim() })
}
