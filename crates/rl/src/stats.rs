use serde::Serialize;

/// Summary of a set of episode rewards.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EpisodeStats {
    pub count: usize,
    pub mean: f32,
    pub max: f32,
    /// `sqrt(population variance / count)`.
    pub std_error: f32,
}

impl EpisodeStats {
    /// `None` for an empty slice.
    #[must_use]
    pub fn from_rewards(rewards: &[f32]) -> Option<Self> {
        if rewards.is_empty() {
            return None;
        }
        let n = rewards.len() as f32;
        let mean = rewards.iter().sum::<f32>() / n;
        let var = rewards.iter().map(|r| (r - mean).powi(2)).sum::<f32>() / n;
        let max = rewards.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        Some(Self { count: rewards.len(), mean, max, std_error: (var / n).sqrt() })
    }
}

/// One record per training iteration, handed to every telemetry sink.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IterationStats {
    pub iteration: usize,
    pub average_reward: f32,
    pub max_reward: f32,
    pub reward_std_error: f32,
    /// Reward of the most recent complete episode seen so far.
    pub eval_reward: Option<f32>,
    /// Complete episodes in the batch.
    pub episodes: usize,
    pub steps: usize,
    /// Critic loss of the first critic step, `None` when the critic is not
    /// trained.
    pub critic_loss: Option<f32>,
    pub actor_loss: f32,
}
