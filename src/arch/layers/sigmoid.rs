use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};

use crate::{
    arch::{Params, Shape},
    MlErr, Result, Seed,
};

/// A logistic activation layer with a configurable amplitude.
#[derive(Debug, Clone, Copy)]
pub struct Sigmoid {
    amp: f32,
}

impl Sigmoid {
    /// Creates a new `Sigmoid`.
    ///
    /// # Arguments
    /// * `amp` - The amplitude, i.e. the upper bound of the activation.
    pub fn new(amp: f32) -> Self {
        Self { amp }
    }

    fn f(&self, z: f32) -> f32 {
        self.amp / (1.0 + (-z).exp())
    }

    fn df(&self, z: f32) -> f32 {
        let a = self.f(z);
        (a * (self.amp - a)) / self.amp
    }

    pub fn init(&self, _seed: Seed, input_shape: &Shape) -> Result<(Shape, Params)> {
        if self.amp <= 0.0 {
            return Err(MlErr::InvalidConfig("sigmoid amplitude must be positive"));
        }

        Ok((input_shape.clone(), Params::Empty))
    }

    pub fn apply(&self, params: &Params, sample: ArrayView1<f32>) -> Result<Array1<f32>> {
        expect_empty(params)?;
        Ok(sample.mapv(|z| self.f(z)))
    }

    pub fn out_dim(&self, in_dim: usize) -> usize {
        in_dim
    }

    pub fn forward_batch_into(
        &self,
        params: &Params,
        x: ArrayView2<f32>,
        out: &mut Array2<f32>,
    ) -> Result<()> {
        expect_empty(params)?;
        check_same_dim(x, out.view())?;

        out.zip_mut_with(&x, |o, &z| *o = self.f(z));
        Ok(())
    }

    pub fn backward_batch_into(
        &self,
        params: &Params,
        x: ArrayView2<f32>,
        d_out: ArrayView2<f32>,
        grad: &mut Params,
        d_in: &mut Array2<f32>,
    ) -> Result<()> {
        expect_empty(params)?;
        expect_empty(grad)?;
        check_same_dim(x, d_out)?;
        check_same_dim(x, d_in.view())?;

        Zip::from(d_in)
            .and(&x)
            .and(&d_out)
            .for_each(|di, &z, &d| *di = d * self.df(z));
        Ok(())
    }
}

pub(super) fn expect_empty(params: &Params) -> Result<()> {
    match params {
        Params::Empty => Ok(()),
        _ => Err(MlErr::StructureMismatch { what: "empty leaf" }),
    }
}

pub(super) fn check_same_dim(x: ArrayView2<f32>, other: ArrayView2<f32>) -> Result<()> {
    if x.dim() != other.dim() {
        return Err(MlErr::ShapeMismatch {
            what: "activation batch",
            got: other.len(),
            expected: x.len(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use ndarray::array;

    use super::*;

    #[test]
    fn test_apply_saturates_at_the_amplitude() {
        let layer = Sigmoid::new(2.0);
        let out = layer
            .apply(&Params::Empty, array![0.0, 50.0, -50.0].view())
            .unwrap();

        assert!((out[0] - 1.0).abs() < 1e-6);
        assert!((out[1] - 2.0).abs() < 1e-6);
        assert!(out[2].abs() < 1e-6);
    }

    #[test]
    fn test_init_keeps_the_input_shape() {
        let layer = Sigmoid::new(1.0);
        let shape = Shape::new([4]).unwrap();
        let (out_shape, params) = layer.init(Seed::new(0), &shape).unwrap();

        assert_eq!(out_shape, shape);
        assert_eq!(params, Params::Empty);
    }

    #[test]
    fn test_init_rejects_non_positive_amplitude() {
        let layer = Sigmoid::new(0.0);
        let shape = Shape::new([1]).unwrap();

        assert!(layer.init(Seed::new(0), &shape).is_err());
    }

    #[test]
    fn test_backward_uses_the_logistic_derivative() {
        let layer = Sigmoid::new(1.0);
        let x = array![[0.0]];
        let d_out = array![[1.0]];
        let mut grad = Params::Empty;
        let mut d_in = Array2::zeros((1, 1));

        layer
            .backward_batch_into(&Params::Empty, x.view(), d_out.view(), &mut grad, &mut d_in)
            .unwrap();

        // s'(0) = 0.25 for the unit logistic
        assert!((d_in[[0, 0]] - 0.25).abs() < 1e-6);
    }
}
