use crate::tensor::Tensor;

/// Numerically stable softmax of one row of scores.
#[must_use]
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let m = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = logits.iter().map(|&v| (v - m).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

/// `log(softmax(logits))` via log-sum-exp.
#[must_use]
pub fn log_softmax(logits: &[f32]) -> Vec<f32> {
    let m = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let lse = m + logits.iter().map(|&v| (v - m).exp()).sum::<f32>().ln();
    logits.iter().map(|&v| v - lse).collect()
}

/// Draws an index from `probs` by inverse-CDF sampling.
///
/// Rounding can leave the cumulative sum slightly below one; the last index
/// with non-zero mass absorbs the remainder.
#[must_use]
pub fn sample_index(probs: &[f32], rng: &mut fastrand::Rng) -> usize {
    let u = rng.f32();
    let mut acc = 0.0;
    let mut last = 0;
    for (i, &p) in probs.iter().enumerate() {
        if p <= 0.0 {
            continue;
        }
        acc += p;
        last = i;
        if u < acc {
            return i;
        }
    }
    last
}

/// Row-wise categorical distributions parameterised by unnormalised scores.
pub struct Categorical<'a> {
    logits: &'a Tensor,
}

impl<'a> Categorical<'a> {
    #[must_use]
    pub fn new(logits: &'a Tensor) -> Self {
        Self { logits }
    }

    /// One sampled class per row.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Vec<usize> {
        self.logits
            .iter_rows()
            .map(|row| sample_index(&softmax(row), rng))
            .collect()
    }

    /// `log π(a_i | row_i)` for each row.
    ///
    /// # Panics
    ///
    /// Panics if `actions` is not one per row or an action is out of range.
    #[must_use]
    pub fn log_prob(&self, actions: &[usize]) -> Vec<f32> {
        assert_eq!(actions.len(), self.logits.rows());
        self.logits
            .iter_rows()
            .zip(actions)
            .map(|(row, &a)| log_softmax(row)[a])
            .collect()
    }
}
