//! fiwgan: Featural InfoWaveGAN training for raw audio
//!
//! Trains a WaveGAN generator against a strided-convolution critic while an
//! auxiliary Q network learns to recover a Bernoulli code from the generated
//! audio. Built on a small tape autograd engine over `ndarray`.
//!
//! # Modules
//!
//! - [`autograd`]: tensors, reverse-mode gradients (including gradients of gradients)
//! - [`optim`]: Keras-style Adam and RMSprop, value clipping
//! - [`generative`]: generator, discriminator, Q network, losses, the training step
//! - [`data`]: batch sources over WAV directories or in-memory slices
//! - [`train`]: epoch driver with callbacks
//! - [`io`]: safetensors snapshots
//! - [`summary`]: scalar and audio summaries
//! - [`config`]: YAML run configuration
//! - [`cli`]: the `fiwgan` command line
//!
//! # Example
//!
//! ```no_run
//! use fiwgan::data::InMemorySource;
//! use fiwgan::generative::{BatchGeometry, ModelConfig, TrainingState};
//! use fiwgan::train::{GanTrainer, TrainOptions};
//! use ndarray::Array3;
//!
//! let model = ModelConfig { dim: 8, ..Default::default() };
//! let geometry = BatchGeometry::new(4, 16384, 1);
//! let state = TrainingState::new(&model, geometry, Some(42))?;
//! let mut source = InMemorySource::new(Array3::zeros((16, 16384, 1)), 4, 42)?;
//!
//! let mut trainer = GanTrainer::new(state, TrainOptions::new(2, 16000));
//! let result = trainer.train(&mut source)?;
//! println!("trained {} steps", result.global_step);
//! # Ok::<(), fiwgan::Error>(())
//! ```

pub mod autograd;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod generative;
pub mod io;
pub mod optim;
pub mod summary;
pub mod train;

pub use autograd::Tensor;
pub use error::{Error, Result};
