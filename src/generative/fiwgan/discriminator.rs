//! Discriminator: audio slice to one score per example.

use super::config::DiscriminatorConfig;
use super::layers::Dense;
use super::network::Network;
use super::trunk::ConvTrunk;
use crate::autograd::{reshape, sigmoid, Context, Tensor};
use crate::error::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// How the final dense output becomes a score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreActivation {
    /// Probability-like score (dcgan, lsgan)
    Sigmoid,
    /// Raw critic value (wgan, wgan-gp)
    Linear,
}

/// Discriminator network
pub struct Discriminator {
    /// Configuration
    pub config: DiscriminatorConfig,
    trunk: ConvTrunk,
    head: Dense,
    activation: ScoreActivation,
}

impl Discriminator {
    /// Create a new discriminator with random initialization
    pub fn new(config: DiscriminatorConfig, activation: ScoreActivation) -> Result<Self> {
        Self::from_rng(config, activation, &mut StdRng::from_os_rng())
    }

    /// Create a new discriminator with a seed for reproducibility
    pub fn with_seed(config: DiscriminatorConfig, activation: ScoreActivation, seed: u64) -> Result<Self> {
        Self::from_rng(config, activation, &mut StdRng::seed_from_u64(seed))
    }

    /// Create a discriminator drawing initial weights from `rng`
    pub fn from_rng<R: Rng>(config: DiscriminatorConfig, activation: ScoreActivation, rng: &mut R) -> Result<Self> {
        let trunk = ConvTrunk::new(&config, rng)?;
        let head = Dense::new(rng, trunk.flat_features(), 1);
        Ok(Self { config, trunk, head, activation })
    }

    /// Score `(B, slice_len, channels)` audio as `(B,)`
    pub fn forward(&self, x: &Tensor, ctx: &Context) -> Tensor {
        let batch = x.shape()[0];
        let logits = reshape(&self.head.forward(&self.trunk.forward(x, ctx)), &[batch]);
        match self.activation {
            ScoreActivation::Sigmoid => sigmoid(&logits),
            ScoreActivation::Linear => logits,
        }
    }

    pub fn activation(&self) -> ScoreActivation {
        self.activation
    }
}

impl Network for Discriminator {
    fn name(&self) -> &'static str {
        "discriminator"
    }

    fn named_parameters(&self) -> Vec<(String, Tensor)> {
        let mut params = self.trunk.named_parameters();
        params.extend(self.head.named_parameters("head"));
        params
    }

    fn named_buffers(&self) -> Vec<(String, Tensor)> {
        self.trunk.named_buffers()
    }
}
