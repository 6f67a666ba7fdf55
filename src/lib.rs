pub mod arch;
pub mod batch;
pub mod dataset;
pub mod error;
pub mod optimization;
pub mod seed;
pub mod specs;
pub mod training;

pub use dataset::Dataset;
pub use error::{MlErr, Result};
pub use seed::Seed;
