use crate::{arch::Params, Result};

/// A parameter-update rule expressed as pure state transitions.
///
/// An optimizer never owns a model and never mutates in place: `init` wraps
/// parameters into an opaque state, `update` derives a new state from the
/// previous one, and `params` projects the current parameter values back
/// out. Given identical arguments, `update` is bit-for-bit deterministic —
/// there is no hidden randomness and no wall-clock dependence.
pub trait Optimizer {
    /// The optimizer's state: the wrapped parameters plus whatever
    /// bookkeeping the update rule needs.
    type State;

    /// Wraps initial parameters into optimizer state.
    ///
    /// Auxiliary accumulators start at zero.
    fn init(&self, params: Params) -> Self::State;

    /// Derives the next state from one gradient observation.
    ///
    /// # Arguments
    /// * `step` - The 0-based training step index.
    /// * `grad` - The gradient; must match the wrapped parameter structure.
    /// * `state` - The previous state, consumed.
    ///
    /// # Errors
    /// Returns `MlErr` if `grad` disagrees with the wrapped parameters on
    /// structure or leaf shapes.
    fn update(&self, step: usize, grad: &Params, state: Self::State) -> Result<Self::State>;

    /// Projects the current parameter values out of the state.
    fn params<'s>(&self, state: &'s Self::State) -> &'s Params;
}
