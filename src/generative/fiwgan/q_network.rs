//! Auxiliary network Q: recovers the latent code from generated audio.

use super::config::DiscriminatorConfig;
use super::layers::Dense;
use super::network::Network;
use super::trunk::ConvTrunk;
use crate::autograd::{sigmoid, Context, Tensor};
use crate::error::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Q network: discriminator-shaped trunk with a `num_categ` sigmoid head
pub struct QNetwork {
    /// Trunk configuration
    pub config: DiscriminatorConfig,
    trunk: ConvTrunk,
    head: Dense,
}

impl QNetwork {
    /// Create a new Q network with random initialization
    pub fn new(config: DiscriminatorConfig, num_categ: usize) -> Result<Self> {
        Self::from_rng(config, num_categ, &mut StdRng::from_os_rng())
    }

    /// Create a new Q network with a seed for reproducibility
    pub fn with_seed(config: DiscriminatorConfig, num_categ: usize, seed: u64) -> Result<Self> {
        Self::from_rng(config, num_categ, &mut StdRng::seed_from_u64(seed))
    }

    /// Create a Q network drawing initial weights from `rng`
    pub fn from_rng<R: Rng>(config: DiscriminatorConfig, num_categ: usize, rng: &mut R) -> Result<Self> {
        let trunk = ConvTrunk::new(&config, rng)?;
        let head = Dense::new(rng, trunk.flat_features(), num_categ);
        Ok(Self { config, trunk, head })
    }

    /// Predict code probabilities `(B, num_categ)` from audio
    pub fn forward(&self, x: &Tensor, ctx: &Context) -> Tensor {
        sigmoid(&self.head.forward(&self.trunk.forward(x, ctx)))
    }

    /// Number of code features predicted
    pub fn num_categ(&self) -> usize {
        self.head.out_features()
    }
}

impl Network for QNetwork {
    fn name(&self) -> &'static str {
        "q_network"
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
