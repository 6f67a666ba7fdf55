use std::time::Instant;

use funcnet::{
    arch::{layers::Layer, loss::Mse, Sequential},
    optimization::{Adam, Optimizer},
    specs::TrainerSpec,
    training::{PreparedStep, Train, Trainer, TrainerBuilder},
    Dataset, Seed,
};
use log::info;
use ndarray::Array2;
use ndarray_rand::RandomExt;
use rand_distr::Uniform;

const ITERATIONS: usize = 1000;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let seed = Seed::new(42);
    let (data_seed, init_seed) = seed.split();

    // A noiseless line: y = 3x + 5.
    let inputs = Array2::random_using((256, 1), Uniform::new(-1.0, 1.0)?, &mut data_seed.rng());
    let targets = inputs.mapv(|x| 3.0 * x + 5.0);
    let data = Dataset::new(inputs, targets)?;
    info!("fitting y = 3x + 5 over {} samples", data.len());

    // Spec-driven path: resolve a trainer from a declarative description.
    let spec: TrainerSpec = serde_json::from_str(
        r#"{
            "layers": [{"dense": {"units": 1}}],
            "optimizer": {"adam": {"step_size": 0.05, "beta1": 0.9, "beta2": 0.999, "epsilon": 1e-8}},
            "loss": "mse",
            "iterations": 1000
        }"#,
    )?;
    let trainer = TrainerBuilder::new().build(&spec)?;

    let params = trainer.fit(init_seed, &data)?;
    let (weights, biases) = params.as_list()?[0].as_dense()?;
    info!(
        "spec-driven fit recovered weight {:.4} and bias {:.4}",
        weights[[0, 0]],
        biases[0]
    );

    // Direct path, timing the per-step loop against its prepared variant.
    let model = Sequential::new([Layer::dense(1)]);
    let optimizer = Adam::new(0.05, 0.9, 0.999, 1e-8)?;
    let loss = Mse::new();
    let trainer = Trainer::new(model.clone(), optimizer, loss, ITERATIONS);

    let start = Instant::now();
    let mut state = trainer.init_state(init_seed, &data)?;
    for i in 0..ITERATIONS {
        state = trainer.step(i, state, data.inputs(), data.targets())?;
    }
    let plain_elapsed = start.elapsed();
    let (weights, biases) = optimizer.params(&state).as_list()?[0].as_dense()?;
    info!(
        "per-step loop finished in {plain_elapsed:?} (weight {:.4}, bias {:.4})",
        weights[[0, 0]],
        biases[0]
    );

    let setup_start = Instant::now();
    let mut state = trainer.init_state(init_seed, &data)?;
    let mut prepared = PreparedStep::new(&model, &optimizer, &loss, &data, optimizer.params(&state))?;
    let setup_elapsed = setup_start.elapsed();

    let start = Instant::now();
    for i in 0..ITERATIONS {
        state = prepared.step(i, state)?;
    }
    let prepared_elapsed = start.elapsed();
    let (weights, biases) = optimizer.params(&state).as_list()?[0].as_dense()?;
    info!(
        "prepared loop finished in {prepared_elapsed:?} after {setup_elapsed:?} of setup \
         (weight {:.4}, bias {:.4})",
        weights[[0, 0]],
        biases[0]
    );

    Ok(())
}
