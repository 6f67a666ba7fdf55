use ndarray::Array2;

use crate::{
    arch::{loss::LossFn, Model, Params, Sequential},
    dataset::Dataset,
    optimization::Optimizer,
    MlErr, Result,
};

/// A step transition specialized to a fixed dataset and parameter
/// structure.
///
/// Construction validates every shape once and allocates the forward and
/// backward scratch buffers; each subsequent `step` reuses them instead of
/// allocating fresh intermediates. That trades a one-time setup cost for
/// cheaper iterations, and must produce states numerically equivalent to
/// the plain per-step path.
pub struct PreparedStep<'a, O: Optimizer, L: LossFn> {
    model: &'a Sequential,
    optimizer: &'a O,
    loss: &'a L,
    data: &'a Dataset,
    acts: Vec<Array2<f32>>,
    deltas: Vec<Array2<f32>>,
    d_input: Array2<f32>,
    grad: Params,
}

impl<'a, O: Optimizer, L: LossFn> PreparedStep<'a, O, L> {
    /// Prepares a step for the given dataset and parameter structure.
    ///
    /// # Arguments
    /// * `model` - The model driving the step.
    /// * `optimizer` - The parameter-update rule.
    /// * `loss` - The loss function.
    /// * `data` - The batch every step will run against.
    /// * `params` - A parameter tree of the structure every step will see.
    ///
    /// # Returns
    /// An error if the parameters, dataset, and model disagree on any
    /// shape.
    pub fn new(
        model: &'a Sequential,
        optimizer: &'a O,
        loss: &'a L,
        data: &'a Dataset,
        params: &Params,
    ) -> Result<Self> {
        if model.layers().is_empty() {
            return Err(MlErr::InvalidInput("prepared steps need at least one layer"));
        }

        // One full pass flushes out every shape problem before the loop.
        let y_pred = model.apply_batch(params, data.inputs())?;
        if y_pred.dim() != data.targets().dim() {
            return Err(MlErr::ShapeMismatch {
                what: "targets",
                got: data.targets().len(),
                expected: y_pred.len(),
            });
        }

        let batch = data.len();
        let mut dim = data.input_shape().dims()[0];
        let mut acts = Vec::with_capacity(model.layers().len());
        let mut deltas = Vec::with_capacity(model.layers().len());

        for layer in model.layers() {
            dim = layer.out_dim(dim);
            acts.push(Array2::zeros((batch, dim)));
            deltas.push(Array2::zeros((batch, dim)));
        }

        Ok(Self {
            model,
            optimizer,
            loss,
            data,
            acts,
            deltas,
            d_input: Array2::zeros((batch, data.input_shape().dims()[0])),
            grad: params.zeros_like(),
        })
    }

    /// Advances the loop by one step, reusing the prepared buffers.
    ///
    /// # Arguments
    /// * `step` - The 0-based step index.
    /// * `state` - The optimizer state going into the step, consumed.
    ///
    /// # Returns
    /// The optimizer state coming out of the step.
    pub fn step(&mut self, step: usize, state: O::State) -> Result<O::State> {
        let layers = self.model.layers();
        let nlayers = layers.len();
        let params = self.optimizer.params(&state);
        let leaves = params.as_list()?;

        if leaves.len() != nlayers {
            return Err(MlErr::ShapeMismatch {
                what: "parameter list",
                got: leaves.len(),
                expected: nlayers,
            });
        }

        for (i, (layer, leaf)) in layers.iter().zip(leaves).enumerate() {
            let (done, rest) = self.acts.split_at_mut(i);
            let x = match done.last() {
                Some(prev) => prev.view(),
                None => self.data.inputs(),
            };

            layer.forward_batch_into(leaf, x, &mut rest[0])?;
        }

        let y_pred = self.acts[nlayers - 1].view();
        let loss_delta = self.loss.loss_prime(y_pred, self.data.targets());
        self.deltas[nlayers - 1].assign(&loss_delta);

        let Params::List(grad_leaves) = &mut self.grad else {
            return Err(MlErr::StructureMismatch { what: "gradient" });
        };

        for (i, (layer, leaf)) in layers.iter().zip(leaves).enumerate().rev() {
            let x = match i {
                0 => self.data.inputs(),
                _ => self.acts[i - 1].view(),
            };

            if i == 0 {
                layer.backward_batch_into(
                    leaf,
                    x,
                    self.deltas[0].view(),
                    &mut grad_leaves[0],
                    &mut self.d_input,
                )?;
            } else {
                let (head, tail) = self.deltas.split_at_mut(i);
                layer.backward_batch_into(
                    leaf,
                    x,
                    tail[0].view(),
                    &mut grad_leaves[i],
                    &mut head[i - 1],
                )?;
            }
        }

        self.optimizer.update(step, &self.grad, state)
    }
}
