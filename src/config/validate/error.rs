//! Validation error types

use crate::generative::SUPPORTED_SLICE_LENS;
use crate::Error;

/// Validation error type
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("Unknown loss variant '{0}' (must be one of: dcgan, lsgan, wgan, wgan-gp)")]
    UnknownLoss(String),

    #[error("Unsupported slice length: {0} (must be one of {SUPPORTED_SLICE_LENS:?})")]
    UnsupportedSliceLen(usize),

    #[error("Invalid channel count: {0} (must be 1 or 2)")]
    InvalidChannels(usize),

    #[error("Invalid sample rate: {0} (must be > 0)")]
    InvalidSampleRate(u32),

    #[error("Invalid overlap ratio: {0} (must be in [0.0, 1.0))")]
    InvalidOverlap(f32),

    #[error("Code length {num_categ} exceeds latent dimension {latent_dim}")]
    CodeExceedsLatent { num_categ: usize, latent_dim: usize },

    #[error("Invalid latent dimension: {0} (must be > 0)")]
    InvalidLatentDim(usize),

    #[error("Invalid kernel length: {0} (must be > 0)")]
    InvalidKernelLen(usize),

    #[error("Invalid model dim: {0} (must be > 0)")]
    InvalidDim(usize),

    #[error("Phase shuffle radius {rad} too large for slice length {slice_len} (must be <= {max})")]
    PhaseShuffleTooLarge { rad: usize, slice_len: usize, max: usize },

    #[error("Invalid post-processing filter length: {0} (must be > 0)")]
    InvalidPostProcLen(usize),

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid log interval: {0} (must be > 0)")]
    InvalidLogInterval(usize),

    #[error("Invalid job id '{0}' (must be a single path component)")]
    InvalidJobId(String),
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::UnknownLoss(name) => Error::NotImplemented(format!("loss variant '{name}'")),
            other => Error::ConfigError(format!("Invalid config: {other}")),
        }
    }
}
