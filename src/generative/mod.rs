//! Generative models for raw audio
//!
//! The fiwGAN family: a WaveGAN generator and discriminator trained together
//! with an auxiliary network that recovers the generator's binary latent code.

pub mod fiwgan;

pub use fiwgan::{
    BatchGeometry, Discriminator, GanLoss, GanStats, Generator, LatentBatch, ModelConfig,
    Network, QNetwork, StepResult, TrainingState, UpsampleMode, max_phaseshuffle_rad,
    SUPPORTED_SLICE_LENS,
};
