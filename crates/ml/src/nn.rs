use crate::tensor::Tensor;
use serde::{Deserialize, Serialize};

/// A differentiable layer operating on `[rows, cols]` batches.
pub trait Layer {
    fn forward(&self, x: &Tensor) -> Tensor;

    /// Given the layer input `x` and the gradient of the loss w.r.t. the
    /// layer output, returns the gradient w.r.t. `x` and one gradient per
    /// parameter in [`Layer::params`] order.
    fn backward(&self, x: &Tensor, grad: &Tensor) -> (Tensor, Vec<Tensor>);

    fn params(&self) -> Vec<&Tensor> {
        Vec::new()
    }

    fn params_mut(&mut self) -> Vec<&mut Tensor> {
        Vec::new()
    }
}

/// A fully connected layer computing `y = x Wᵀ + b`.
#[derive(Clone, Debug)]
pub struct Dense {
    /// Weight matrix of shape `[out_dim, in_dim]`.
    pub w: Tensor,
    /// Bias vector of shape `[out_dim]`.
    pub b: Tensor,
    in_dim: usize,
    out_dim: usize,
}

impl Dense {
    /// # Panics
    ///
    /// Panics if the weight or bias length disagrees with the dimensions.
    #[must_use]
    pub fn new(weights: Vec<f32>, bias: Vec<f32>, in_dim: usize, out_dim: usize) -> Self {
        assert_eq!(weights.len(), in_dim * out_dim);
        assert_eq!(bias.len(), out_dim);
        Self {
            w: Tensor::from_vec(vec![out_dim, in_dim], weights),
            b: Tensor::from_vec(vec![out_dim], bias),
            in_dim,
            out_dim,
        }
    }

    /// Glorot-uniform weights, zero bias.
    #[must_use]
    pub fn xavier(in_dim: usize, out_dim: usize, rng: &mut fastrand::Rng) -> Self {
        let limit = (6.0f32 / (in_dim as f32 + out_dim as f32)).sqrt();
        let weights = (0..in_dim * out_dim)
            .map(|_| rng.f32() * 2.0 * limit - limit)
            .collect();
        Self::new(weights, vec![0.0; out_dim], in_dim, out_dim)
    }
}

impl Layer for Dense {
    fn forward(&self, x: &Tensor) -> Tensor {
        assert_eq!(x.cols(), self.in_dim, "dense input width");
        let rows = x.rows();
        let mut y = vec![0f32; rows * self.out_dim];
        for (xr, yr) in x.iter_rows().zip(y.chunks_exact_mut(self.out_dim.max(1))) {
            let w_rows = self.w.data.chunks_exact(self.in_dim.max(1));
            for ((yo, w_row), b) in yr.iter_mut().zip(w_rows).zip(&self.b.data) {
                *yo = w_row.iter().zip(xr).map(|(w, v)| w * v).sum::<f32>() + b;
            }
        }
        Tensor::from_vec(vec![rows, self.out_dim], y)
    }

    fn backward(&self, x: &Tensor, grad: &Tensor) -> (Tensor, Vec<Tensor>) {
        let rows = x.rows();
        let mut grad_input = vec![0.0; rows * self.in_dim];
        let mut grad_w = vec![0.0; self.in_dim * self.out_dim];
        let mut grad_b = vec![0.0; self.out_dim];
        let grad_rows = grad.data.chunks_exact(self.out_dim.max(1));
        for ((xr, gr), gi_row) in x.iter_rows().zip(grad_rows).zip(grad_input.chunks_exact_mut(self.in_dim.max(1))) {
            for (o, &go) in gr.iter().enumerate() {
                let span = o * self.in_dim..(o + 1) * self.in_dim;
                let w_row = &self.w.data[span.clone()];
                for (((gw, gi), &xv), &wv) in grad_w[span].iter_mut().zip(gi_row.iter_mut()).zip(xr).zip(w_row) {
                    *gw += go * xv;
                    *gi += wv * go;
                }
                grad_b[o] += go;
            }
        }
        (
            Tensor::from_vec(vec![rows, self.in_dim], grad_input),
            vec![
                Tensor::from_vec(vec![self.out_dim, self.in_dim], grad_w),
                Tensor::from_vec(vec![self.out_dim], grad_b),
            ],
        )
    }

    fn params(&self) -> Vec<&Tensor> {
        vec![&self.w, &self.b]
    }

    fn params_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.w, &mut self.b]
    }
}

#[derive(Default, Clone, Copy, Debug)]
pub struct Relu;

impl Layer for Relu {
    fn forward(&self, x: &Tensor) -> Tensor {
        let data = x.data.iter().map(|&v| v.max(0.0)).collect();
        Tensor::from_vec(x.shape.clone(), data)
    }

    fn backward(&self, x: &Tensor, grad: &Tensor) -> (Tensor, Vec<Tensor>) {
        let data = x
            .data
            .iter()
            .zip(&grad.data)
            .map(|(&v, &g)| if v > 0.0 { g } else { 0.0 })
            .collect();
        (Tensor::from_vec(x.shape.clone(), data), Vec::new())
    }
}

#[derive(Default, Clone, Copy, Debug)]
pub struct TanhAct;

impl Layer for TanhAct {
    fn forward(&self, x: &Tensor) -> Tensor {
        let data = x.data.iter().map(|&v| v.tanh()).collect();
        Tensor::from_vec(x.shape.clone(), data)
    }

    fn backward(&self, x: &Tensor, grad: &Tensor) -> (Tensor, Vec<Tensor>) {
        let data = x
            .data
            .iter()
            .zip(&grad.data)
            .map(|(&v, &g)| {
                let t = v.tanh();
                g * (1.0 - t * t)
            })
            .collect();
        (Tensor::from_vec(x.shape.clone(), data), Vec::new())
    }
}

/// Hidden-layer nonlinearity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Relu,
    Tanh,
}

/// Layers applied in order.
#[derive(Default)]
pub struct Sequential {
    layers: Vec<Box<dyn Layer>>,
}

impl Sequential {
    #[must_use]
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    pub fn push<L: Layer + 'static>(&mut self, layer: L) {
        self.layers.push(Box::new(layer));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Returns the output together with every intermediate activation,
    /// starting with the input itself. The activations feed [`Self::backward`].
    #[must_use]
    pub fn forward(&self, x: &Tensor) -> (Tensor, Vec<Tensor>) {
        let mut out = x.clone();
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        for layer in &self.layers {
            let next = layer.forward(&out);
            activations.push(out);
            out = next;
        }
        activations.push(out.clone());
        (out, activations)
    }

    /// Output only, for callers that never differentiate.
    #[must_use]
    pub fn predict(&self, x: &Tensor) -> Tensor {
        self.layers.iter().fold(x.clone(), |out, layer| layer.forward(&out))
    }

    /// Backpropagates `grad` (w.r.t. the network output). Parameter
    /// gradients come back in [`Self::params_mut`] order.
    #[must_use]
    pub fn backward(&self, activations: &[Tensor], grad: &Tensor) -> (Tensor, Vec<Tensor>) {
        let mut grad_out = grad.clone();
        let mut per_layer = Vec::with_capacity(self.layers.len());
        for (layer, input) in self.layers.iter().zip(activations).rev() {
            let (g_in, p) = layer.backward(input, &grad_out);
            grad_out = g_in;
            per_layer.push(p);
        }
        let param_grads = per_layer.into_iter().rev().flatten().collect();
        (grad_out, param_grads)
    }

    #[must_use]
    pub fn params(&self) -> Vec<&Tensor> {
        self.layers.iter().flat_map(|l| l.params()).collect()
    }

    pub fn params_mut(&mut self) -> Vec<&mut Tensor> {
        let mut out = Vec::new();
        for layer in &mut self.layers {
            out.extend(layer.params_mut());
        }
        out
    }
}

/// Builds `hidden_layers` dense layers of width `hidden_size` (each followed
/// by `activation`) and one linear output layer of width `output_dim`.
#[must_use]
pub fn mlp(
    input_dim: usize,
    output_dim: usize,
    hidden_layers: usize,
    hidden_size: usize,
    activation: Activation,
    rng: &mut fastrand::Rng,
) -> Sequential {
    let mut net = Sequential::new();
    let mut width = input_dim;
    for _ in 0..hidden_layers {
        net.push(Dense::xavier(width, hidden_size, rng));
        match activation {
            Activation::Relu => net.push(Relu),
            Activation::Tanh => net.push(TanhAct),
        }
        width = hidden_size;
    }
    net.push(Dense::xavier(width, output_dim, rng));
    net
}
