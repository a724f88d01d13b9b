//! Configuration types for the fiwGAN networks.

use serde::{Deserialize, Serialize};

/// Slice lengths the WaveGAN layer stacks are defined for
pub const SUPPORTED_SLICE_LENS: [usize; 3] = [16384, 32768, 65536];

/// Generator upsampling strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsampleMode {
    /// Transposed convolution (zero-stuffing)
    #[default]
    Zeros,
    /// Nearest-neighbour upsampling followed by a stride-1 convolution
    Nn,
}

/// Hyperparameters shared by G, D and Q
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Total latent dimension (code + continuous)
    pub latent_dim: usize,
    /// Number of Bernoulli code features at the front of the latent
    pub num_categ: usize,
    /// Length of 1-D filter kernels
    pub kernel_len: usize,
    /// Channel multiplier for every network
    pub dim: usize,
    /// Insert batch normalization between layers
    pub use_batchnorm: bool,
    /// GAN objective: dcgan, lsgan, wgan or wgan-gp
    pub loss: String,
    /// Generator upsampling strategy
    pub upsample: UpsampleMode,
    /// Apply a learned post-processing filter to G's output
    pub post_proc_filter: bool,
    /// Length of the post-processing filter
    pub post_proc_len: usize,
    /// Phase shuffle radius for D and Q (0 disables)
    pub phaseshuffle_rad: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            latent_dim: 100,
            num_categ: 3,
            kernel_len: 25,
            dim: 64,
            use_batchnorm: false,
            loss: "wgan-gp".to_string(),
            upsample: UpsampleMode::Zeros,
            post_proc_filter: false,
            post_proc_len: 512,
            phaseshuffle_rad: 2,
        }
    }
}

/// Generator network configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub latent_dim: usize,
    pub slice_len: usize,
    pub num_channels: usize,
    pub kernel_len: usize,
    pub dim: usize,
    pub use_batchnorm: bool,
    pub upsample: UpsampleMode,
    /// Post-processing filter length, if enabled
    pub post_proc_len: Option<usize>,
}

/// Convolutional trunk configuration shared by D and Q
#[derive(Debug, Clone, PartialEq)]
pub struct DiscriminatorConfig {
    pub slice_len: usize,
    pub num_channels: usize,
    pub kernel_len: usize,
    pub dim: usize,
    pub use_batchnorm: bool,
    pub phaseshuffle_rad: usize,
}

/// Fixed shape of every real batch in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchGeometry {
    pub batch_size: usize,
    pub slice_len: usize,
    pub num_channels: usize,
}

impl BatchGeometry {
    pub fn new(batch_size: usize, slice_len: usize, num_channels: usize) -> Self {
        Self { batch_size, slice_len, num_channels }
    }

    /// `[batch_size, slice_len, num_channels]`
    pub fn shape(&self) -> [usize; 3] {
        [self.batch_size, self.slice_len, self.num_channels]
    }
}

impl ModelConfig {
    /// Generator configuration for audio of the given geometry
    pub fn generator(&self, slice_len: usize, num_channels: usize) -> GeneratorConfig {
        GeneratorConfig {
            latent_dim: self.latent_dim,
            slice_len,
            num_channels,
            kernel_len: self.kernel_len,
            dim: self.dim,
            use_batchnorm: self.use_batchnorm,
            upsample: self.upsample,
            post_proc_len: self.post_proc_filter.then_some(self.post_proc_len),
        }
    }

    /// Discriminator (and Q trunk) configuration for audio of the given geometry
    pub fn discriminator(&self, slice_len: usize, num_channels: usize) -> DiscriminatorConfig {
        DiscriminatorConfig {
            slice_len,
            num_channels,
            kernel_len: self.kernel_len,
            dim: self.dim,
            use_batchnorm: self.use_batchnorm,
            phaseshuffle_rad: self.phaseshuffle_rad,
        }
    }

    /// Length of the continuous (uniform) part of the latent
    pub fn continuous_dim(&self) -> usize {
        self.latent_dim.saturating_sub(self.num_categ)
    }
}
