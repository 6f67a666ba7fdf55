use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::{MlErr, Result};

/// Lifts a per-sample function over the leading batch axis.
///
/// Every row of `inputs` is passed through `f` independently and the
/// outputs are stacked back into a batch. This is the reference semantics a
/// batched fast path must agree with.
///
/// # Arguments
/// * `f` - The per-sample function.
/// * `inputs` - A batch with one sample per row.
///
/// # Returns
/// The stacked outputs, or an error if the batch is empty or `f` fails on
/// any sample.
pub fn vectorize<F>(mut f: F, inputs: ArrayView2<f32>) -> Result<Array2<f32>>
where
    F: FnMut(ArrayView1<f32>) -> Result<Array1<f32>>,
{
    let mut rows = Vec::with_capacity(inputs.nrows());
    for sample in inputs.outer_iter() {
        rows.push(f(sample)?);
    }

    let width = match rows.first() {
        Some(row) => row.len(),
        None => return Err(MlErr::InvalidInput("cannot vectorize over an empty batch")),
    };

    let mut outputs = Array2::zeros((rows.len(), width));
    for (mut out, row) in outputs.outer_iter_mut().zip(&rows) {
        if row.len() != width {
            return Err(MlErr::ShapeMismatch {
                what: "sample output",
                got: row.len(),
                expected: width,
            });
        }

        out.assign(row);
    }

    Ok(outputs)
}
