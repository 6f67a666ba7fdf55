use ndarray::{Array2, ArrayView2};

use crate::{
    arch::Shape,
    MlErr, Result,
};

/// A fixed batch of training data.
///
/// Inputs and targets are stored row-aligned: sample `i` of `inputs` is
/// expected to produce row `i` of `targets`. Construction validates the
/// alignment once so the training loop can rely on it.
#[derive(Debug, Clone)]
pub struct Dataset {
    inputs: Array2<f32>,
    targets: Array2<f32>,
    input_shape: Shape,
    target_shape: Shape,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Arguments
    /// * `inputs` - A batch with one sample per row.
    /// * `targets` - The expected outputs, row-aligned with `inputs`.
    ///
    /// # Returns
    /// An error if the row counts disagree or either side has no rows or
    /// no columns.
    pub fn new(inputs: Array2<f32>, targets: Array2<f32>) -> Result<Self> {
        if inputs.nrows() == 0 {
            return Err(MlErr::InvalidInput("datasets need at least one sample"));
        }

        if targets.nrows() != inputs.nrows() {
            return Err(MlErr::ShapeMismatch {
                what: "target rows",
                got: targets.nrows(),
                expected: inputs.nrows(),
            });
        }

        let input_shape = Shape::new([inputs.ncols()])?;
        let target_shape = Shape::new([targets.ncols()])?;

        Ok(Self {
            inputs,
            targets,
            input_shape,
            target_shape,
        })
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.inputs.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn inputs(&self) -> ArrayView2<f32> {
        self.inputs.view()
    }

    pub fn targets(&self) -> ArrayView2<f32> {
        self.targets.view()
    }

    /// Returns the per-sample input shape.
    pub fn input_shape(&self) -> &Shape {
        &self.input_shape
    }

    /// Returns the per-sample target shape.
    pub fn target_shape(&self) -> &Shape {
        &self.target_shape
    }
}

#[cfg(test)]
mod test {
    use ndarray::array;

    use super::*;

    #[test]
    fn test_new_records_per_sample_shapes() {
        let data = Dataset::new(array![[1.0, 2.0], [3.0, 4.0]], array![[1.0], [2.0]]).unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data.input_shape().dims(), &[2]);
        assert_eq!(data.target_shape().dims(), &[1]);
    }

    #[test]
    fn test_new_rejects_misaligned_rows() {
        let err = Dataset::new(array![[1.0], [2.0]], array![[1.0]]).unwrap_err();
        assert!(matches!(err, MlErr::ShapeMismatch { what: "target rows", .. }));
    }

    #[test]
    fn test_new_rejects_empty_data() {
        let inputs = Array2::zeros((0, 1));
        let targets = Array2::zeros((0, 1));

        assert!(Dataset::new(inputs, targets).is_err());
    }
}
