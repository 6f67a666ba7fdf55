use super::Optimizer;
use crate::{arch::Params, MlErr, Result};

/// Adam optimization algorithm.
///
/// Keeps exponential moving averages of the first and second gradient
/// moments and applies bias-corrected steps.
#[derive(Debug, Clone, Copy)]
pub struct Adam {
    step_size: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
}

/// The state of an [`Adam`] run: current parameters plus both moment
/// estimates, all sharing the parameter tree's structure.
#[derive(Debug, Clone, PartialEq)]
pub struct AdamState {
    params: Params,
    mean: Params,
    var: Params,
}

impl Adam {
    /// Returns a new `Adam`.
    ///
    /// # Arguments
    /// * `step_size` - The length of the bias-corrected steps.
    /// * `beta1` - The decay rate of the first-moment average.
    /// * `beta2` - The decay rate of the second-moment average.
    /// * `epsilon` - The denominator fuzz term.
    ///
    /// # Returns
    /// An error if `step_size` or `epsilon` is not positive, or either beta
    /// lies outside `[0, 1)`.
    pub fn new(step_size: f32, beta1: f32, beta2: f32, epsilon: f32) -> Result<Self> {
        if !(step_size > 0.0) {
            return Err(MlErr::InvalidConfig("step size must be positive"));
        }

        if !(0.0..1.0).contains(&beta1) || !(0.0..1.0).contains(&beta2) {
            return Err(MlErr::InvalidConfig("betas must lie in [0, 1)"));
        }

        if !(epsilon > 0.0) {
            return Err(MlErr::InvalidConfig("epsilon must be positive"));
        }

        Ok(Self {
            step_size,
            beta1,
            beta2,
            epsilon,
        })
    }
}

impl Optimizer for Adam {
    type State = AdamState;

    fn init(&self, params: Params) -> AdamState {
        AdamState {
            mean: params.zeros_like(),
            var: params.zeros_like(),
            params,
        }
    }

    fn update(&self, step: usize, grad: &Params, state: AdamState) -> Result<AdamState> {
        let Self {
            step_size,
            beta1,
            beta2,
            epsilon,
        } = *self;

        let mean = state
            .mean
            .zip_with(grad, |m, g| beta1 * m + (1.0 - beta1) * g)?;
        let var = state
            .var
            .zip_with(grad, |v, g| beta2 * v + (1.0 - beta2) * g * g)?;

        // Bias correction counts steps from 1.
        let t = (step + 1) as i32;
        let correction1 = 1.0 - beta1.powi(t);
        let correction2 = 1.0 - beta2.powi(t);

        let deltas = mean.zip_with(&var, |m, v| {
            step_size * (m / correction1) / ((v / correction2).sqrt() + epsilon)
        })?;
        let params = state.params.zip_with(&deltas, |p, d| p - d)?;

        Ok(AdamState { params, mean, var })
    }

    fn params<'s>(&self, state: &'s AdamState) -> &'s Params {
        &state.params
    }
}

#[cfg(test)]
mod test {
    use ndarray::array;

    use super::*;

    fn params() -> Params {
        Params::Dense {
            weights: array![[1.0, 2.0]],
            biases: array![0.0],
        }
    }

    #[test]
    fn test_init_round_trips_the_parameters() {
        let adam = Adam::new(0.01, 0.9, 0.999, 1e-8).unwrap();
        let state = adam.init(params());

        assert_eq!(adam.params(&state), &params());
    }

    #[test]
    fn test_update_is_bit_deterministic() {
        let adam = Adam::new(0.01, 0.9, 0.999, 1e-8).unwrap();
        let grad = params().map(|p| p * 0.5);
        let state = adam.init(params());

        let a = adam.update(0, &grad, state.clone()).unwrap();
        let b = adam.update(0, &grad, state).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_first_step_moves_by_the_step_size() {
        // With bias correction, the very first step has magnitude
        // step_size * g / (|g| + eps) regardless of the gradient scale.
        let adam = Adam::new(0.1, 0.9, 0.999, 1e-8).unwrap();
        let grad = Params::Dense {
            weights: array![[4.0, -4.0]],
            biases: array![0.25],
        };

        let state = adam.update(0, &grad, adam.init(params())).unwrap();
        let (weights, biases) = adam.params(&state).as_dense().unwrap();

        assert!((weights[[0, 0]] - 0.9).abs() < 1e-5);
        assert!((weights[[0, 1]] - 2.1).abs() < 1e-5);
        assert!((biases[0] + 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_update_rejects_mismatched_gradient() {
        let adam = Adam::new(0.01, 0.9, 0.999, 1e-8).unwrap();
        let state = adam.init(params());

        assert!(adam.update(0, &Params::Empty, state).is_err());
    }

    #[test]
    fn test_rejects_invalid_configuration() {
        assert!(Adam::new(0.0, 0.9, 0.999, 1e-8).is_err());
        assert!(Adam::new(-0.1, 0.9, 0.999, 1e-8).is_err());
        assert!(Adam::new(0.01, 1.0, 0.999, 1e-8).is_err());
        assert!(Adam::new(0.01, 0.9, -0.1, 1e-8).is_err());
        assert!(Adam::new(0.01, 0.9, 0.999, 0.0).is_err());
    }
}
