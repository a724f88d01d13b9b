//! Training state and the per-step loss/update engine.

mod state;
mod stats;
mod step;
mod step_result;


pub use state::TrainingState;
pub use stats::GanStats;
pub use step::StepForward;
pub use step_result::{StepResult, DISCRIMINATOR_LOSS, GENERATOR_LOSS, GRADIENT_PENALTY, Q_LOSS};
