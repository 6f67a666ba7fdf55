use super::{Train, Trainer};
use crate::{
    arch::{layers::Layer, loss::{LossFn, Mse}, Model, Sequential},
    optimization::{Adam, GradientDescent, Optimizer},
    specs::{LayerSpec, LossFnSpec, OptimizerSpec, TrainerSpec},
    Result,
};

/// Builds `Trainer`s given a specification.
#[derive(Default)]
pub struct TrainerBuilder;

impl TrainerBuilder {
    /// Creates a new `TrainerBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new `Trainer` following a spec.
    ///
    /// # Arguments
    /// * `spec` - The specification for the trainer.
    ///
    /// # Returns
    /// An error if any configured value is invalid (e.g. a non-positive
    /// step size).
    pub fn build(&self, spec: &TrainerSpec) -> Result<Box<dyn Train>> {
        self.resolve_model(spec)
    }

    fn resolve_model(&self, spec: &TrainerSpec) -> Result<Box<dyn Train>> {
        let layers = spec.layers.iter().map(|ls| self.resolve_layer(*ls));
        let model = Sequential::new(layers);
        self.resolve_optimizer(spec, model)
    }

    fn resolve_layer(&self, spec: LayerSpec) -> Layer {
        match spec {
            LayerSpec::Dense { units } => Layer::dense(units),
            LayerSpec::Sigmoid { amp } => Layer::sigmoid(amp),
            LayerSpec::Relu => Layer::relu(),
        }
    }

    fn resolve_optimizer<M>(&self, spec: &TrainerSpec, model: M) -> Result<Box<dyn Train>>
    where
        M: Model + 'static,
    {
        match spec.optimizer {
            OptimizerSpec::Adam {
                step_size,
                beta1,
                beta2,
                epsilon,
            } => {
                let optimizer = Adam::new(step_size, beta1, beta2, epsilon)?;
                self.resolve_loss(spec, model, optimizer)
            }
            OptimizerSpec::GradientDescent { learning_rate } => {
                let optimizer = GradientDescent::new(learning_rate)?;
                self.resolve_loss(spec, model, optimizer)
            }
        }
    }

    fn resolve_loss<M, O>(&self, spec: &TrainerSpec, model: M, optimizer: O) -> Result<Box<dyn Train>>
    where
        M: Model + 'static,
        O: Optimizer + 'static,
    {
        match spec.loss {
            LossFnSpec::Mse => self.terminate_build(spec, model, optimizer, Mse::new()),
        }
    }

    fn terminate_build<M, O, L>(
        &self,
        spec: &TrainerSpec,
        model: M,
        optimizer: O,
        loss: L,
    ) -> Result<Box<dyn Train>>
    where
        M: Model + 'static,
        O: Optimizer + 'static,
        L: LossFn + 'static,
    {
        Ok(Box::new(Trainer::new(model, optimizer, loss, spec.iterations)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_build_rejects_invalid_optimizer_config() {
        let spec = TrainerSpec {
            layers: vec![LayerSpec::Dense { units: 1 }],
            optimizer: OptimizerSpec::GradientDescent {
                learning_rate: -1.0,
            },
            loss: LossFnSpec::Mse,
            iterations: 10,
        };

        assert!(TrainerBuilder::new().build(&spec).is_err());
    }
}
