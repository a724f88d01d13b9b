//! Epoch-level training driver
//!
//! [`GanTrainer`] runs a [`TrainingState`](crate::generative::TrainingState)
//! over a [`BatchSource`](crate::data::BatchSource) for a number of epochs:
//! - one training step per batch, with losses logged as scalar summaries
//! - an audio summary of the last fake batch at the end of every epoch
//! - generator, discriminator and Q snapshots overwritten at the end of every epoch
//! - callbacks on train, epoch and step boundaries
//!
//! # Example
//!
//! ```no_run
//! use fiwgan::data::InMemorySource;
//! use fiwgan::generative::{BatchGeometry, ModelConfig, TrainingState};
//! use fiwgan::summary::MemorySummaryWriter;
//! use fiwgan::train::{GanTrainer, ProgressCallback, TrainOptions};
//! use ndarray::Array3;
//!
//! let state = TrainingState::new(&ModelConfig::default(), BatchGeometry::new(2, 16384, 1), Some(0))?;
//! let mut source = InMemorySource::new(Array3::zeros((4, 16384, 1)), 2, 0)?;
//!
//! let mut trainer = GanTrainer::new(state, TrainOptions::new(1, 16000).with_run_dir("runs/demo"));
//! trainer.set_summary_writer(Box::new(MemorySummaryWriter::new()));
//! trainer.add_callback(ProgressCallback::new(10));
//! let result = trainer.train(&mut source)?;
//! # Ok::<(), fiwgan::Error>(())
//! ```

mod batch;
pub mod callback;
mod trainer;

pub use batch::AudioBatch;
pub use callback::{CallbackAction, CallbackContext, CallbackManager, ProgressCallback, TrainerCallback};
pub use trainer::{GanTrainer, TrainOptions, TrainResult};
