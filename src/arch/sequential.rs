use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use super::{layers::Layer, loss::LossFn, Model, Params, Shape};
use crate::{MlErr, Result, Seed};

/// A sequential model: each layer consumes the previous layer's output.
///
/// Initialization threads the shape descriptor through the chain, so a
/// layer that cannot consume its predecessor's output fails at init time,
/// not in the middle of a training step.
#[derive(Debug, Clone)]
pub struct Sequential {
    layers: Vec<Layer>,
}

impl Sequential {
    /// Creates a new `Sequential`.
    ///
    /// # Arguments
    /// * `layers` - The layers the model is composed of.
    pub fn new<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Layer>,
    {
        Self {
            layers: layers.into_iter().collect(),
        }
    }

    /// Returns the layers of this model.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    fn leaves<'p>(&self, params: &'p Params) -> Result<&'p [Params]> {
        let leaves = params.as_list()?;

        if leaves.len() != self.layers.len() {
            return Err(MlErr::ShapeMismatch {
                what: "parameter list",
                got: leaves.len(),
                expected: self.layers.len(),
            });
        }

        Ok(leaves)
    }
}

impl Model for Sequential {
    fn init(&self, seed: Seed, input_shape: &Shape) -> Result<(Shape, Params)> {
        let mut shape = input_shape.clone();
        let mut key = seed;
        let mut leaves = Vec::with_capacity(self.layers.len());

        for layer in &self.layers {
            let (layer_key, next_key) = key.split();
            key = next_key;

            let (out_shape, params) = layer.init(layer_key, &shape)?;
            shape = out_shape;
            leaves.push(params);
        }

        Ok((shape, Params::List(leaves)))
    }

    fn apply(&self, params: &Params, sample: ArrayView1<f32>) -> Result<Array1<f32>> {
        let leaves = self.leaves(params)?;
        let mut x = sample.to_owned();

        for (layer, leaf) in self.layers.iter().zip(leaves) {
            x = layer.apply(leaf, x.view())?;
        }

        Ok(x)
    }

    fn apply_batch(&self, params: &Params, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        let leaves = self.leaves(params)?;
        let mut x = inputs.to_owned();

        for (layer, leaf) in self.layers.iter().zip(leaves) {
            x = layer.forward_batch(leaf, x.view())?;
        }

        Ok(x)
    }

    // Reverse-mode differentiation through the chain: a forward pass records
    // every intermediate batch, then the loss delta is pulled back layer by
    // layer while the per-layer gradients are collected.
    fn loss_grad<L: LossFn>(
        &self,
        params: &Params,
        loss: &L,
        inputs: ArrayView2<f32>,
        targets: ArrayView2<f32>,
    ) -> Result<(f32, Params)> {
        let leaves = self.leaves(params)?;

        let mut acts = Vec::with_capacity(self.layers.len() + 1);
        acts.push(inputs.to_owned());
        for (layer, leaf) in self.layers.iter().zip(leaves) {
            let out = layer.forward_batch(leaf, acts.last().unwrap().view())?;
            acts.push(out);
        }

        let y_pred = acts.last().unwrap();
        if y_pred.dim() != targets.dim() {
            return Err(MlErr::ShapeMismatch {
                what: "targets",
                got: targets.len(),
                expected: y_pred.len(),
            });
        }

        let value = loss.loss(y_pred.view(), targets);
        let mut delta = loss.loss_prime(y_pred.view(), targets);

        let mut grads = Vec::with_capacity(self.layers.len());
        for (i, (layer, leaf)) in self.layers.iter().zip(leaves).enumerate().rev() {
            let (grad, d_in) = layer.backward_batch(leaf, acts[i].view(), delta.view())?;
            grads.push(grad);
            delta = d_in;
        }
        grads.reverse();

        Ok((value, Params::List(grads)))
    }
}

#[cfg(test)]
mod test {
    use ndarray::array;

    use super::*;
    use crate::arch::loss::Mse;

    #[test]
    fn test_init_threads_shapes_through_the_chain() {
        let model = Sequential::new([Layer::dense(3), Layer::sigmoid(1.0), Layer::dense(1)]);
        let (out_shape, params) = model
            .init(Seed::new(0), &Shape::new([2]).unwrap())
            .unwrap();

        assert_eq!(out_shape.dims(), &[1]);

        let leaves = params.as_list().unwrap();
        assert_eq!(leaves.len(), 3);

        let (weights, _) = leaves[0].as_dense().unwrap();
        assert_eq!(weights.dim(), (2, 3));
        assert_eq!(leaves[1], Params::Empty);

        let (weights, _) = leaves[2].as_dense().unwrap();
        assert_eq!(weights.dim(), (3, 1));
    }

    #[test]
    fn test_sibling_layers_get_independent_seeds() {
        let model = Sequential::new([Layer::dense(2), Layer::dense(2)]);
        let (_, params) = model
            .init(Seed::new(0), &Shape::new([2]).unwrap())
            .unwrap();

        let leaves = params.as_list().unwrap();
        assert_ne!(leaves[0], leaves[1]);
    }

    #[test]
    fn test_apply_chains_the_layers() {
        let model = Sequential::new([Layer::dense(2), Layer::relu()]);
        let params = Params::List(vec![
            Params::Dense {
                weights: array![[1.0, -1.0]],
                biases: array![0.0, 0.0],
            },
            Params::Empty,
        ]);

        let out = model.apply(&params, array![2.0].view()).unwrap();
        assert_eq!(out, array![2.0, 0.0]);
    }

    #[test]
    fn test_batched_fast_path_matches_per_sample_application() {
        let model = Sequential::new([Layer::dense(4), Layer::sigmoid(1.0), Layer::dense(2)]);
        let (_, params) = model
            .init(Seed::new(3), &Shape::new([3]).unwrap())
            .unwrap();

        for batch_size in 1..=5 {
            let inputs = Array2::from_shape_fn((batch_size, 3), |(i, j)| {
                (i as f32 + 1.0) * 0.3 - j as f32 * 0.7
            });

            let fast = model.apply_batch(&params, inputs.view()).unwrap();
            let reference =
                crate::batch::vectorize(|s| model.apply(&params, s), inputs.view()).unwrap();

            assert!(
                fast.iter()
                    .zip(&reference)
                    .all(|(a, b)| (a - b).abs() < 1e-6),
                "batched apply diverged at batch size {batch_size}"
            );
        }
    }

    #[test]
    fn test_loss_grad_matches_the_analytic_gradient() {
        // One dense unit, MSE over two samples: the gradient is
        // dL/dw = 2/N * sum(x * (w x + b - y)), dL/db = 2/N * sum(w x + b - y).
        let model = Sequential::new([Layer::dense(1)]);
        let params = Params::List(vec![Params::Dense {
            weights: array![[2.0]],
            biases: array![1.0],
        }]);

        let inputs = array![[1.0], [2.0]];
        let targets = array![[2.0], [4.0]];

        let (value, grad) = model
            .loss_grad(&params, &Mse, inputs.view(), targets.view())
            .unwrap();

        // residuals: 1 and 1
        assert!((value - 1.0).abs() < 1e-6);

        let (d_weights, d_biases) = grad.as_list().unwrap()[0].as_dense().unwrap();
        assert!((d_weights[[0, 0]] - 3.0).abs() < 1e-6);
        assert!((d_biases[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_loss_grad_rejects_misaligned_targets() {
        let model = Sequential::new([Layer::dense(1)]);
        let (_, params) = model
            .init(Seed::new(0), &Shape::new([1]).unwrap())
            .unwrap();

        let inputs = array![[1.0], [2.0]];
        let targets = array![[1.0, 2.0], [3.0, 4.0]];

        let err = model
            .loss_grad(&params, &Mse, inputs.view(), targets.view())
            .unwrap_err();
        assert!(matches!(err, MlErr::ShapeMismatch { what: "targets", .. }));
    }
}
