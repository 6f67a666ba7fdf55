use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use super::{Dense, Relu, Sigmoid};
use crate::{
    arch::{Params, Shape},
    Result, Seed,
};

/// A neural network layer.
///
/// Every variant honors the same pure contract: `init` allocates parameters
/// for a given input shape, `apply` transforms one sample, and the batch
/// variants lift the same transform over a leading batch axis. Nothing is
/// cached between calls; the inputs a backward pass needs are passed in
/// explicitly.
#[derive(Debug, Clone, Copy)]
pub enum Layer {
    Dense(Dense),
    Sigmoid(Sigmoid),
    Relu(Relu),
}

impl Layer {
    pub fn dense(units: usize) -> Self {
        Self::Dense(Dense::new(units))
    }

    pub fn sigmoid(amp: f32) -> Self {
        Self::Sigmoid(Sigmoid::new(amp))
    }

    pub fn relu() -> Self {
        Self::Relu(Relu::new())
    }

    /// Allocates freshly initialized parameters for the given input shape.
    ///
    /// # Arguments
    /// * `seed` - The seed the parameter values are drawn from.
    /// * `input_shape` - The per-sample input shape.
    ///
    /// # Returns
    /// The shape downstream layers should expect, and the new parameters.
    pub fn init(&self, seed: Seed, input_shape: &Shape) -> Result<(Shape, Params)> {
        match self {
            Self::Dense(l) => l.init(seed, input_shape),
            Self::Sigmoid(l) => l.init(seed, input_shape),
            Self::Relu(l) => l.init(seed, input_shape),
        }
    }

    /// Applies the layer to a single sample.
    pub fn apply(&self, params: &Params, sample: ArrayView1<f32>) -> Result<Array1<f32>> {
        match self {
            Self::Dense(l) => l.apply(params, sample),
            Self::Sigmoid(l) => l.apply(params, sample),
            Self::Relu(l) => l.apply(params, sample),
        }
    }

    /// Returns the output width for a given input width.
    pub fn out_dim(&self, in_dim: usize) -> usize {
        match self {
            Self::Dense(l) => l.out_dim(in_dim),
            Self::Sigmoid(l) => l.out_dim(in_dim),
            Self::Relu(l) => l.out_dim(in_dim),
        }
    }

    /// Applies the layer to a whole batch, writing into `out`.
    pub fn forward_batch_into(
        &self,
        params: &Params,
        x: ArrayView2<f32>,
        out: &mut Array2<f32>,
    ) -> Result<()> {
        match self {
            Self::Dense(l) => l.forward_batch_into(params, x, out),
            Self::Sigmoid(l) => l.forward_batch_into(params, x, out),
            Self::Relu(l) => l.forward_batch_into(params, x, out),
        }
    }

    /// Applies the layer to a whole batch.
    pub fn forward_batch(&self, params: &Params, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let mut out = Array2::zeros((x.nrows(), self.out_dim(x.ncols())));
        self.forward_batch_into(params, x, &mut out)?;
        Ok(out)
    }

    /// Computes the parameter gradient and input delta for a batch, writing
    /// into the provided buffers.
    pub fn backward_batch_into(
        &self,
        params: &Params,
        x: ArrayView2<f32>,
        d_out: ArrayView2<f32>,
        grad: &mut Params,
        d_in: &mut Array2<f32>,
    ) -> Result<()> {
        match self {
            Self::Dense(l) => l.backward_batch_into(params, x, d_out, grad, d_in),
            Self::Sigmoid(l) => l.backward_batch_into(params, x, d_out, grad, d_in),
            Self::Relu(l) => l.backward_batch_into(params, x, d_out, grad, d_in),
        }
    }

    /// Computes the parameter gradient and input delta for a batch.
    pub fn backward_batch(
        &self,
        params: &Params,
        x: ArrayView2<f32>,
        d_out: ArrayView2<f32>,
    ) -> Result<(Params, Array2<f32>)> {
        let mut grad = params.zeros_like();
        let mut d_in = Array2::zeros(x.raw_dim());
        self.backward_batch_into(params, x, d_out, &mut grad, &mut d_in)?;
        Ok((grad, d_in))
    }
}
