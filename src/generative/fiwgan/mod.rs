//! fiwGAN: WaveGAN with an auxiliary code predictor
//!
//! Three networks are trained together on raw audio:
//! - Generator (G): latent vector to audio slice
//! - Discriminator (D): audio slice to a real/fake score
//! - Q network: generated audio back to the binary code at the front of the latent
//!
//! # Architecture
//!
//! ```text
//! code ~ Bernoulli(0.5) ─┐
//!                        ├─► z ─► G ─► fake ─┬─► D ─► d_fake
//! noise ~ U(-1, 1) ──────┘                   ├─► Q ─► code estimate
//!                                            │
//!            real audio ─────────────────────┴─► D ─► d_real
//! ```
//!
//! Under wgan-gp, D also scores interpolates between real and fake audio and
//! is penalized when its input gradient norm strays from 1.
//!
//! # Example
//!
//! ```rust,no_run
//! use fiwgan::generative::{BatchGeometry, ModelConfig, TrainingState};
//! use ndarray::Array3;
//!
//! let model = ModelConfig { dim: 2, ..Default::default() };
//! let mut state = TrainingState::new(&model, BatchGeometry::new(2, 16384, 1), Some(0))?;
//! let result = state.train_step(&Array3::zeros((2, 16384, 1)))?;
//! println!("G_loss {} D_loss {}", result.g_loss, result.d_loss);
//! # Ok::<(), fiwgan::Error>(())
//! ```

pub mod config;
mod discriminator;
mod gan;
mod generator;
pub mod latent;
mod layers;
pub mod loss;
mod network;
mod normalization;
mod phase_shuffle;
mod q_network;
mod trunk;

pub use config::{
    BatchGeometry, DiscriminatorConfig, GeneratorConfig, ModelConfig, UpsampleMode,
    SUPPORTED_SLICE_LENS,
};
pub use discriminator::{Discriminator, ScoreActivation};
pub use gan::{
    GanStats, StepForward, StepResult, TrainingState, DISCRIMINATOR_LOSS, GENERATOR_LOSS,
    GRADIENT_PENALTY, Q_LOSS,
};
pub use generator::Generator;
pub use latent::LatentBatch;
pub use loss::{GanLoss, LossTerms, OptimizerPlan};
pub use network::Network;
pub use normalization::{BatchNorm, Normalization};
pub use phase_shuffle::{phase_shift, phase_shuffle};
pub use q_network::QNetwork;
pub use trunk::max_phaseshuffle_rad;
