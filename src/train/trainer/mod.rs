//! GAN trainer: epochs of training steps with summaries and snapshots
//!
//! - `core`: the `GanTrainer` struct, options and accessors
//! - `epoch`: one pass over the batch schedule
//! - `train_loop`: multi-epoch training with callbacks

mod core;
mod epoch;
mod result;
mod train_loop;


pub use core::{GanTrainer, TrainOptions};
pub use result::TrainResult;
