use crate::dist::{log_softmax, softmax};
use crate::tensor::Tensor;

/// Score-function loss `-Σ log π(a_i|s_i) · A_i`, summed over the batch.
///
/// Returns the loss and its gradient w.r.t. `logits`, which for a softmax
/// policy is `(softmax(logits_i) - onehot(a_i)) · A_i` per row.
///
/// # Panics
///
/// Panics if `actions` or `advantages` are not one per row.
#[must_use]
pub fn policy_gradient_loss(logits: &Tensor, actions: &[usize], advantages: &[f32]) -> (f32, Tensor) {
    assert_eq!(actions.len(), logits.rows());
    assert_eq!(advantages.len(), logits.rows());
    let cols = logits.cols();
    let mut loss = 0.0;
    let mut grad = Vec::with_capacity(logits.len());
    for ((row, &a), &adv) in logits.iter_rows().zip(actions).zip(advantages) {
        loss -= log_softmax(row)[a] * adv;
        let probs = softmax(row);
        for (j, p) in probs.into_iter().enumerate() {
            let onehot = if j == a { 1.0 } else { 0.0 };
            grad.push((p - onehot) * adv);
        }
    }
    (loss, Tensor::from_vec(vec![logits.rows(), cols], grad))
}

/// Mean squared error between a `[rows, 1]` prediction and `targets`.
///
/// Returns the loss and its gradient w.r.t. `pred`. An empty batch has zero
/// loss and an empty gradient.
///
/// # Panics
///
/// Panics if `pred` is not a single column with one row per target.
#[must_use]
pub fn mse_loss(pred: &Tensor, targets: &[f32]) -> (f32, Tensor) {
    assert_eq!(pred.cols(), 1);
    assert_eq!(pred.rows(), targets.len());
    let n = targets.len();
    if n == 0 {
        return (0.0, Tensor::zeros(pred.shape.clone()));
    }
    let scale = 1.0 / n as f32;
    let mut loss = 0.0;
    let mut grad = Vec::with_capacity(n);
    for (&p, &t) in pred.data.iter().zip(targets) {
        let d = p - t;
        loss += d * d * scale;
        grad.push(2.0 * d * scale);
    }
    (loss, Tensor::from_vec(pred.shape.clone(), grad))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_gradient_grad_matches_finite_difference() {
        let logits = Tensor::from_rows(3, &[vec![0.2, -0.4, 1.0], vec![0.0, 0.5, -0.5]]);
        let actions = [2, 0];
        let adv = [1.5, -0.7];
        let (_, grad) = policy_gradient_loss(&logits, &actions, &adv);
        let eps = 1e-2;
        for i in 0..logits.len() {
            let mut plus = logits.clone();
            let mut minus = logits.clone();
            plus.data[i] += eps;
            minus.data[i] -= eps;
            let numeric = (policy_gradient_loss(&plus, &actions, &adv).0
                - policy_gradient_loss(&minus, &actions, &adv).0)
                / (2.0 * eps);
            assert!((numeric - grad.data[i]).abs() < 1e-3, "index {i}: {numeric} vs {}", grad.data[i]);
        }
    }

    #[test]
    fn mse_of_exact_prediction_is_zero() {
        let pred = Tensor::from_vec(vec![2, 1], vec![1.0, 2.0]);
        let (loss, grad) = mse_loss(&pred, &[1.0, 2.0]);
        assert_eq!(loss, 0.0);
        assert_eq!(grad.data, vec![0.0, 0.0]);
    }

    #[test]
    fn mse_is_mean_over_rows() {
        let pred = Tensor::from_vec(vec![2, 1], vec![1.0, 0.0]);
        let (loss, grad) = mse_loss(&pred, &[0.0, 0.0]);
        assert!((loss - 0.5).abs() < 1e-6);
        assert!((grad.data[0] - 1.0).abs() < 1e-6);
    }
}
