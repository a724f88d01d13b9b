//! Optimizers for training neural networks

mod adam;
mod clip;
mod optimizer;
mod rmsprop;
mod spec;

pub use adam::Adam;
pub use clip::clip_by_value;
pub use optimizer::Optimizer;
pub use rmsprop::RMSprop;
pub use spec::{OptimizerKind, OptimizerSpec};
