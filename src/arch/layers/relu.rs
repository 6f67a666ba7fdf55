use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};

use super::sigmoid::{check_same_dim, expect_empty};
use crate::{
    arch::{Params, Shape},
    Result, Seed,
};

/// A rectified linear activation layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Relu;

impl Relu {
    /// Creates a new `Relu`.
    pub fn new() -> Self {
        Self
    }

    pub fn init(&self, _seed: Seed, input_shape: &Shape) -> Result<(Shape, Params)> {
        Ok((input_shape.clone(), Params::Empty))
    }

    pub fn apply(&self, params: &Params, sample: ArrayView1<f32>) -> Result<Array1<f32>> {
        expect_empty(params)?;
        Ok(sample.mapv(|z| z.max(0.0)))
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

        out.zip_mut_with(&x, |o, &z| *o = z.max(0.0));
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
            .for_each(|di, &z, &d| *di = if z > 0.0 { d } else { 0.0 });
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use ndarray::array;

    use super::*;

    #[test]
    fn test_apply_clamps_negatives() {
        let out = Relu::new()
            .apply(&Params::Empty, array![-1.0, 0.0, 2.0].view())
            .unwrap();

        assert_eq!(out, array![0.0, 0.0, 2.0]);
    }

    #[test]
    fn test_backward_masks_inactive_units() {
        let x = array![[-1.0, 2.0]];
        let d_out = array![[3.0, 3.0]];
        let mut grad = Params::Empty;
        let mut d_in = Array2::zeros((1, 2));

        Relu::new()
            .backward_batch_into(&Params::Empty, x.view(), d_out.view(), &mut grad, &mut d_in)
            .unwrap();

        assert_eq!(d_in, array![[0.0, 3.0]]);
    }
}
