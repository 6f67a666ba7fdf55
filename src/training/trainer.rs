use log::debug;
use ndarray::ArrayView2;

use crate::{
    arch::{loss::LossFn, Model, Params},
    dataset::Dataset,
    optimization::Optimizer,
    MlErr, Result, Seed,
};

/// Anything that can fit parameters to a dataset.
///
/// This is the object-safe boundary the spec-driven builder hands out; the
/// concrete implementation is a [`Trainer`].
pub trait Train {
    /// Runs a full training pass and returns the final parameters.
    fn fit(&self, seed: Seed, data: &Dataset) -> Result<Params>;
}

/// A fixed-iteration training loop over a model/optimizer/loss triple.
///
/// All loop state is an explicit value: the optimizer state produced by one
/// step feeds the next, and nothing else carries over. A failed step aborts
/// the whole run; every transition is deterministic, so the failure would
/// only reproduce.
pub struct Trainer<M: Model, O: Optimizer, L: LossFn> {
    model: M,
    optimizer: O,
    loss: L,
    iterations: usize,
}

impl<M: Model, O: Optimizer, L: LossFn> Trainer<M, O, L> {
    /// Creates a new `Trainer`.
    ///
    /// # Arguments
    /// * `model` - The model whose parameters are being fit.
    /// * `optimizer` - The parameter-update rule.
    /// * `loss` - The loss function.
    /// * `iterations` - The number of steps a `fit` call runs.
    pub fn new(model: M, optimizer: O, loss: L, iterations: usize) -> Self {
        Self {
            model,
            optimizer,
            loss,
            iterations,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn optimizer(&self) -> &O {
        &self.optimizer
    }

    pub fn loss_fn(&self) -> &L {
        &self.loss
    }

    /// Initializes model parameters against the dataset's shapes and wraps
    /// them into optimizer state.
    ///
    /// The model's output shape is checked against the dataset's target
    /// shape here, so a miswired chain fails before the first step runs.
    pub fn init_state(&self, seed: Seed, data: &Dataset) -> Result<O::State> {
        let (out_shape, params) = self.model.init(seed, data.input_shape())?;

        if &out_shape != data.target_shape() {
            return Err(MlErr::ShapeMismatch {
                what: "model output",
                got: out_shape.size(),
                expected: data.target_shape().size(),
            });
        }

        Ok(self.optimizer.init(params))
    }

    /// Advances the loop by one step.
    ///
    /// # Arguments
    /// * `step` - The 0-based step index.
    /// * `state` - The optimizer state going into the step, consumed.
    /// * `inputs` - A batch with one sample per row.
    /// * `targets` - The expected outputs, row-aligned with `inputs`.
    ///
    /// # Returns
    /// The optimizer state coming out of the step.
    pub fn step(
        &self,
        step: usize,
        state: O::State,
        inputs: ArrayView2<f32>,
        targets: ArrayView2<f32>,
    ) -> Result<O::State> {
        let params = self.optimizer.params(&state);
        let (loss, grad) = self.model.loss_grad(params, &self.loss, inputs, targets)?;
        debug!("step {step}: loss {loss:.6}");

        self.optimizer.update(step, &grad, state)
    }

    /// Runs the configured number of steps and returns the final
    /// parameters.
    pub fn fit(&self, seed: Seed, data: &Dataset) -> Result<Params> {
        let mut state = self.init_state(seed, data)?;

        for i in 0..self.iterations {
            state = self.step(i, state, data.inputs(), data.targets())?;
        }

        Ok(self.optimizer.params(&state).clone())
    }
}

impl<M: Model, O: Optimizer, L: LossFn> Train for Trainer<M, O, L> {
    fn fit(&self, seed: Seed, data: &Dataset) -> Result<Params> {
        Trainer::fit(self, seed, data)
    }
}
