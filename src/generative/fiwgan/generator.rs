//! WaveGAN generator: latent vector to raw audio.
//!
//! ```text
//! z (B, latent) ─► dense ─► reshape (B, 16, dim·m) ─► norm ─► relu
//!               ─► [upconv stride 4 ─► norm ─► relu] × n ─► upconv ─► tanh ─► [post filter]
//! ```

use super::config::{GeneratorConfig, SUPPORTED_SLICE_LENS};
use super::layers::{Conv1d, Dense, UpConv};
use super::network::Network;
use super::normalization::Normalization;
use crate::autograd::{no_grad, relu, reshape, tanh, Context, Tensor};
use crate::error::{Error, Result};
use ndarray::{Array2, Array3, Ix3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Time steps after the dense projection
const INITIAL_LEN: usize = 16;

struct GenBlock {
    up: UpConv,
    norm: Normalization,
}

/// Generator network
pub struct Generator {
    /// Configuration
    pub config: GeneratorConfig,
    dense: Dense,
    dense_norm: Normalization,
    initial_channels: usize,
    hidden: Vec<GenBlock>,
    output: UpConv,
    post_proc: Option<Conv1d>,
}

impl Generator {
    /// Create a new generator with random initialization
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        Self::from_rng(config, &mut StdRng::from_os_rng())
    }

    /// Create a new generator with a seed for reproducibility
    pub fn with_seed(config: GeneratorConfig, seed: u64) -> Result<Self> {
        Self::from_rng(config, &mut StdRng::seed_from_u64(seed))
    }

    /// Create a generator drawing initial weights from `rng`
    pub fn from_rng<R: Rng>(config: GeneratorConfig, rng: &mut R) -> Result<Self> {
        if !SUPPORTED_SLICE_LENS.contains(&config.slice_len) {
            return Err(Error::ConfigError(format!(
                "generator slice_len {} not in {SUPPORTED_SLICE_LENS:?}",
                config.slice_len
            )));
        }
        let (dim, k) = (config.dim, config.kernel_len);
        let dim_mul = if config.slice_len == 16384 { 16 } else { 32 };
        let hidden_blocks = if config.slice_len == 16384 { 4 } else { 5 };
        let final_stride = if config.slice_len == 32768 { 2 } else { 4 };

        let initial_channels = dim * dim_mul;
        let dense = Dense::new(rng, config.latent_dim, INITIAL_LEN * initial_channels);
        let dense_norm = Normalization::new(config.use_batchnorm, initial_channels);

        let mut channels = initial_channels;
        let mut hidden = Vec::with_capacity(hidden_blocks);
        for _ in 0..hidden_blocks {
            let out = channels / 2;
            hidden.push(GenBlock {
                up: UpConv::new(rng, config.upsample, channels, out, k, 4),
                norm: Normalization::new(config.use_batchnorm, out),
            });
            channels = out;
        }
        let output = UpConv::new(rng, config.upsample, channels, config.num_channels, k, final_stride);
        let post_proc = config
            .post_proc_len
            .map(|len| Conv1d::new(rng, config.num_channels, config.num_channels, len, 1, false));

        Ok(Self { config, dense, dense_norm, initial_channels, hidden, output, post_proc })
    }

    /// Map latents `(B, latent_dim)` to audio `(B, slice_len, channels)`
    pub fn forward(&self, z: &Tensor, ctx: &Context) -> Tensor {
        let batch = z.shape()[0];
        let mut x = self.dense.forward(z);
        x = reshape(&x, &[batch, INITIAL_LEN, self.initial_channels]);
        x = relu(&self.dense_norm.forward(&x, ctx));

        for block in &self.hidden {
            x = relu(&block.norm.forward(&block.up.forward(&x), ctx));
        }
        x = tanh(&self.output.forward(&x));

        // The post filter output is not squashed again
        match &self.post_proc {
            Some(filter) => filter.forward(&x),
            None => x,
        }
    }

    /// Render audio for a batch of latents without recording gradients
    pub fn generate(&self, z: &Array2<f32>, ctx: &Context) -> Result<Array3<f32>> {
        let out = no_grad(|| self.forward(&Tensor::new(z.clone().into_dyn(), false), ctx));
        audio_array(&out, [z.nrows(), self.config.slice_len, self.config.num_channels])
    }
}

/// Copy a generator output out of the graph as `(batch, length, channels)`
pub(crate) fn audio_array(out: &Tensor, expected: [usize; 3]) -> Result<Array3<f32>> {
    let actual = out.shape();
    if actual != expected {
        return Err(Error::ShapeMismatch { expected: expected.to_vec(), actual });
    }
    out.to_array()
        .into_dimensionality::<Ix3>()
        .map_err(|_| Error::ShapeMismatch { expected: expected.to_vec(), actual: out.shape() })
}

impl Network for Generator {
    fn name(&self) -> &'static str {
        "generator"
    }

    fn named_parameters(&self) -> Vec<(String, Tensor)> {
        let mut params = self.dense.named_parameters("dense");
        params.extend(self.dense_norm.named_parameters("dense_norm"));
        for (i, block) in self.hidden.iter().enumerate() {
            params.extend(block.up.named_parameters(&format!("block{i}.conv")));
            params.extend(block.norm.named_parameters(&format!("block{i}.norm")));
        }
        params.extend(self.output.named_parameters("output.conv"));
        if let Some(filter) = &self.post_proc {
            params.extend(filter.named_parameters("post_proc"));
        }
        params
    }

    fn named_buffers(&self) -> Vec<(String, Tensor)> {
        let mut buffers = self.dense_norm.named_buffers("dense_norm");
        for (i, block) in self.hidden.iter().enumerate() {
            buffers.extend(block.norm.named_buffers(&format!("block{i}.norm")));
        }
        buffers
    }
}
