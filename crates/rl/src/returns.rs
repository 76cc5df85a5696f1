use crate::sampler::Batch;

/// Discounted return-to-go of one episode, computed in a single backward
/// pass: `R[T] = r[T]`, `R[t] = r[t] + γ·R[t+1]`.
///
/// A trajectory cut by the step budget is treated as ending where it was cut.
#[must_use]
pub fn discounted_returns(rewards: &[f32], gamma: f32) -> Vec<f32> {
    let mut returns = vec![0.0; rewards.len()];
    let mut running = 0.0;
    for (t, &r) in rewards.iter().enumerate().rev() {
        running = r + gamma * running;
        returns[t] = running;
    }
    returns
}

/// Per-trajectory returns concatenated in trajectory order, aligned with
/// [`Batch::observations`] and [`Batch::actions`].
#[must_use]
pub fn batch_returns(batch: &Batch, gamma: f32) -> Vec<f32> {
    batch
        .trajectories
        .iter()
        .flat_map(|t| discounted_returns(&t.rewards, gamma))
        .collect()
}
