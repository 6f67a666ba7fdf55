mod builder;
mod prepared;
mod trainer;

pub use builder::TrainerBuilder;
pub use prepared::PreparedStep;
pub use trainer::{Train, Trainer};
