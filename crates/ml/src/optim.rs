use crate::tensor::Tensor;

/// Adam optimizer.
///
/// Moment estimates are allocated on the first [`Adam::step`] and carried
/// across every later call, so one instance must stay with one parameter set
/// for its whole life.
#[derive(Clone, Debug)]
pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    eps: f32,
    t: i32,
    m: Vec<Vec<f32>>,
    v: Vec<Vec<f32>>,
}

impl Adam {
    #[must_use]
    pub fn new(lr: f32) -> Self {
        Self { lr, beta1: 0.9, beta2: 0.999, eps: 1e-8, t: 0, m: Vec::new(), v: Vec::new() }
    }

    /// Number of steps taken so far.
    #[must_use]
    pub fn steps(&self) -> i32 {
        self.t
    }

    /// Applies one update to each `(param, grad)` pair.
    ///
    /// # Panics
    ///
    /// Panics if the parameter layout differs from the one seen on the first
    /// call.
    pub fn step(&mut self, params: &mut [(&mut Tensor, &Tensor)]) {
        if self.m.is_empty() {
            self.m = params.iter().map(|(p, _)| vec![0.0; p.len()]).collect();
            self.v = params.iter().map(|(p, _)| vec![0.0; p.len()]).collect();
        }
        assert_eq!(self.m.len(), params.len(), "parameter set changed between steps");
        self.t += 1;
        let bc1 = 1.0 - self.beta1.powi(self.t);
        let bc2 = 1.0 - self.beta2.powi(self.t);
        for ((p, g), (m_vec, v_vec)) in params.iter_mut().zip(self.m.iter_mut().zip(self.v.iter_mut())) {
            assert_eq!(p.len(), g.len());
            let moments = m_vec.iter_mut().zip(v_vec.iter_mut());
            for ((w, &gi), (m, v)) in p.data.iter_mut().zip(&g.data).zip(moments) {
                *m = self.beta1 * *m + (1.0 - self.beta1) * gi;
                *v = self.beta2 * *v + (1.0 - self.beta2) * gi * gi;
                let m_hat = *m / bc1;
                let v_hat = *v / bc2;
                *w -= self.lr * m_hat / (v_hat.sqrt() + self.eps);
            }
        }
    }
}
