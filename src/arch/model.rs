use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::{
    arch::{loss::LossFn, Params, Shape},
    batch, Result, Seed,
};

/// A pure computational model.
///
/// A `Model` defines how to initialize parameters, evaluate a function, and
/// differentiate a scalar loss with respect to those parameters. It does
/// not:
/// - own parameters,
/// - access datasets,
/// - implement training loops.
pub trait Model {
    /// Allocates freshly initialized parameters.
    ///
    /// The parameter shapes are fully determined by `input_shape` and the
    /// model's configuration; the seed only decides the numeric content.
    ///
    /// # Errors
    /// Returns `MlErr` if `input_shape` does not satisfy the model's
    /// composition rules.
    fn init(&self, seed: Seed, input_shape: &Shape) -> Result<(Shape, Params)>;

    /// Evaluates the model on a single sample.
    ///
    /// # Errors
    /// Returns `MlErr` if invariants are violated (e.g., shape mismatch).
    fn apply(&self, params: &Params, sample: ArrayView1<f32>) -> Result<Array1<f32>>;

    /// Evaluates the model on a whole batch, one sample per row.
    ///
    /// The default lifts `apply` over the batch axis sample by sample;
    /// implementations may override it with a batched fast path, which must
    /// agree with the default element-wise.
    fn apply_batch(&self, params: &Params, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        batch::vectorize(|sample| self.apply(params, sample), inputs)
    }

    /// Computes the loss over a batch and its gradient with respect to the
    /// parameters.
    ///
    /// # Arguments
    /// * `params` - The parameters to differentiate with respect to.
    /// * `loss` - The loss function.
    /// * `inputs` - A batch with one sample per row.
    /// * `targets` - The expected outputs, row-aligned with `inputs`.
    ///
    /// # Returns
    /// The scalar loss and a gradient tree of the same structure as
    /// `params`.
    fn loss_grad<L: LossFn>(
        &self,
        params: &Params,
        loss: &L,
        inputs: ArrayView2<f32>,
        targets: ArrayView2<f32>,
    ) -> Result<(f32, Params)>;
}
