use super::Optimizer;
use crate::{arch::Params, MlErr, Result};

/// Gradient descent optimization algorithm.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    learning_rate: f32,
}

/// The state of a [`GradientDescent`] run: just the current parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientDescentState {
    params: Params,
}

impl GradientDescent {
    /// Returns a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps taken on `update`.
    ///
    /// # Returns
    /// An error if `learning_rate` is not positive.
    pub fn new(learning_rate: f32) -> Result<Self> {
        if !(learning_rate > 0.0) {
            return Err(MlErr::InvalidConfig("learning rate must be positive"));
        }

        Ok(Self { learning_rate })
    }
}

impl Optimizer for GradientDescent {
    type State = GradientDescentState;

    fn init(&self, params: Params) -> GradientDescentState {
        GradientDescentState { params }
    }

    /// Takes a step in the opposite direction of the gradient, with a
    /// length of `learning_rate`.
    fn update(
        &self,
        _step: usize,
        grad: &Params,
        state: GradientDescentState,
    ) -> Result<GradientDescentState> {
        let lr = self.learning_rate;

        Ok(GradientDescentState {
            params: state.params.zip_with(grad, |p, g| p - lr * g)?,
        })
    }

    fn params<'s>(&self, state: &'s GradientDescentState) -> &'s Params {
        &state.params
    }
}
