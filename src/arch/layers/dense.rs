use ndarray::{linalg, Array1, Array2, ArrayView1, ArrayView2, Axis};
use ndarray_rand::RandomExt;
use rand_distr::{Normal, Uniform};

use crate::{
    arch::{Params, Shape},
    MlErr, Result, Seed,
};

/// A fully connected layer: `output = sample · W + b`.
///
/// Only the output width is configured up front; the input width is taken
/// from the shape the layer is initialized against, so the same layer value
/// can be chained after anything that produces a rank-1 sample.
#[derive(Debug, Clone, Copy)]
pub struct Dense {
    units: usize,
}

impl Dense {
    /// Creates a new `Dense`.
    ///
    /// # Arguments
    /// * `units` - The number of output features.
    pub fn new(units: usize) -> Self {
        Self { units }
    }

    /// Allocates freshly initialized parameters for the given input shape.
    ///
    /// Weights follow Xavier uniform initialization, biases a narrow normal
    /// distribution; both streams come from independent child seeds.
    ///
    /// # Arguments
    /// * `seed` - The seed the parameter values are drawn from.
    /// * `input_shape` - The per-sample input shape; must be rank 1.
    ///
    /// # Returns
    /// The output shape and the new parameters.
    pub fn init(&self, seed: Seed, input_shape: &Shape) -> Result<(Shape, Params)> {
        if self.units == 0 {
            return Err(MlErr::InvalidConfig("dense layers need at least one unit"));
        }

        if input_shape.rank() != 1 {
            return Err(MlErr::ShapeMismatch {
                what: "dense input rank",
                got: input_shape.rank(),
                expected: 1,
            });
        }

        let fan_in = input_shape.dims()[0];
        let (weight_seed, bias_seed) = seed.split();

        let limit = (6.0 / (fan_in + self.units) as f32).sqrt();
        let weight_dist = Uniform::new(-limit, limit)
            .map_err(|_| MlErr::InvalidConfig("invalid weight initialization range"))?;
        let bias_dist = Normal::new(0.0, 1e-2)
            .map_err(|_| MlErr::InvalidConfig("invalid bias initialization deviation"))?;

        let weights =
            Array2::random_using((fan_in, self.units), weight_dist, &mut weight_seed.rng());
        let biases = Array1::random_using(self.units, bias_dist, &mut bias_seed.rng());

        Ok((Shape::new([self.units])?, Params::Dense { weights, biases }))
    }

    /// Applies the layer to a single sample.
    pub fn apply(&self, params: &Params, sample: ArrayView1<f32>) -> Result<Array1<f32>> {
        let (weights, biases) = params.as_dense()?;

        if sample.len() != weights.nrows() {
            return Err(MlErr::ShapeMismatch {
                what: "sample features",
                got: sample.len(),
                expected: weights.nrows(),
            });
        }

        Ok(sample.dot(weights) + biases)
    }

    pub fn out_dim(&self, _in_dim: usize) -> usize {
        self.units
    }

    /// Applies the layer to a whole batch, writing into `out`.
    ///
    /// # Arguments
    /// * `params` - The layer's parameters.
    /// * `x` - A batch with one sample per row.
    /// * `out` - The output buffer, shaped `[batch, units]`.
    pub fn forward_batch_into(
        &self,
        params: &Params,
        x: ArrayView2<f32>,
        out: &mut Array2<f32>,
    ) -> Result<()> {
        let (weights, biases) = params.as_dense()?;

        if x.ncols() != weights.nrows() {
            return Err(MlErr::ShapeMismatch {
                what: "input features",
                got: x.ncols(),
                expected: weights.nrows(),
            });
        }

        if out.dim() != (x.nrows(), weights.ncols()) {
            return Err(MlErr::ShapeMismatch {
                what: "output buffer",
                got: out.len(),
                expected: x.nrows() * weights.ncols(),
            });
        }

        linalg::general_mat_mul(1.0, &x, weights, 0.0, out);
        *out += biases;
        Ok(())
    }

    /// Computes the parameter gradient and the input delta for a batch,
    /// writing into the provided buffers.
    ///
    /// # Arguments
    /// * `params` - The layer's parameters.
    /// * `x` - The batch the layer was applied to.
    /// * `d_out` - The delta with respect to the layer's output.
    /// * `grad` - The gradient leaf to overwrite; must be a dense leaf.
    /// * `d_in` - The buffer for the delta with respect to `x`.
    pub fn backward_batch_into(
        &self,
        params: &Params,
        x: ArrayView2<f32>,
        d_out: ArrayView2<f32>,
        grad: &mut Params,
        d_in: &mut Array2<f32>,
    ) -> Result<()> {
        let (weights, _) = params.as_dense()?;

        if x.ncols() != weights.nrows() {
            return Err(MlErr::ShapeMismatch {
                what: "input features",
                got: x.ncols(),
                expected: weights.nrows(),
            });
        }

        if d_out.dim() != (x.nrows(), weights.ncols()) {
            return Err(MlErr::ShapeMismatch {
                what: "output delta",
                got: d_out.len(),
                expected: x.nrows() * weights.ncols(),
            });
        }

        if d_in.dim() != x.dim() {
            return Err(MlErr::ShapeMismatch {
                what: "input delta buffer",
                got: d_in.len(),
                expected: x.len(),
            });
        }

        let Params::Dense {
            weights: d_weights,
            biases: d_biases,
        } = grad
        else {
            return Err(MlErr::StructureMismatch { what: "dense leaf" });
        };

        linalg::general_mat_mul(1.0, &x.t(), &d_out, 0.0, d_weights);
        d_biases.assign(&d_out.sum_axis(Axis(0)));
        linalg::general_mat_mul(1.0, &d_out, &weights.t(), 0.0, d_in);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use ndarray::array;

    use super::*;

    #[test]
    fn test_init_shapes_depend_only_on_input_shape() {
        let layer = Dense::new(3);
        let shape = Shape::new([2]).unwrap();

        for seed in [Seed::new(0), Seed::new(1), Seed::new(12345)] {
            let (out_shape, params) = layer.init(seed, &shape).unwrap();
            let (weights, biases) = params.as_dense().unwrap();

            assert_eq!(out_shape.dims(), &[3]);
            assert_eq!(weights.dim(), (2, 3));
            assert_eq!(biases.len(), 3);
        }
    }

    #[test]
    fn test_init_is_deterministic_in_the_seed() {
        let layer = Dense::new(4);
        let shape = Shape::new([3]).unwrap();

        let (_, a) = layer.init(Seed::new(7), &shape).unwrap();
        let (_, b) = layer.init(Seed::new(7), &shape).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_init_rejects_higher_rank_input() {
        let layer = Dense::new(1);
        let shape = Shape::new([2, 2]).unwrap();

        let err = layer.init(Seed::new(0), &shape).unwrap_err();
        assert!(matches!(err, MlErr::ShapeMismatch { .. }));
    }

    #[test]
    fn test_apply_computes_affine_transform() {
        let layer = Dense::new(2);
        let params = Params::Dense {
            weights: array![[1.0, 2.0], [3.0, 4.0]],
            biases: array![0.5, -0.5],
        };

        let out = layer.apply(&params, array![1.0, 1.0].view()).unwrap();
        assert_eq!(out, array![4.5, 5.5]);
    }

    #[test]
    fn test_apply_rejects_wrong_sample_width() {
        let layer = Dense::new(1);
        let (_, params) = layer.init(Seed::new(0), &Shape::new([1]).unwrap()).unwrap();

        let err = layer.apply(&params, array![1.0, 2.0].view()).unwrap_err();
        assert_eq!(
            err,
            MlErr::ShapeMismatch {
                what: "sample features",
                got: 2,
                expected: 1,
            }
        );
    }

    #[test]
    fn test_backward_batch_matches_analytic_gradient() {
        let layer = Dense::new(1);
        let params = Params::Dense {
            weights: array![[2.0]],
            biases: array![1.0],
        };

        let x = array![[1.0], [2.0]];
        let d_out = array![[0.5], [1.0]];
        let mut grad = params.zeros_like();
        let mut d_in = Array2::zeros((2, 1));

        layer
            .backward_batch_into(&params, x.view(), d_out.view(), &mut grad, &mut d_in)
            .unwrap();

        let (d_weights, d_biases) = grad.as_dense().unwrap();
        assert_eq!(d_weights, &array![[2.5]]);
        assert_eq!(d_biases, &array![1.5]);
        assert_eq!(d_in, array![[1.0], [2.0]]);
    }
}
