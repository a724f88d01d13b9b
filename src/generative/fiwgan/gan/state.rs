//! Explicit training state: networks, optimizers, counters and random sources.

use super::stats::GanStats;
use crate::autograd::Context;
use crate::error::{Error, Result};
use crate::generative::fiwgan::config::{BatchGeometry, ModelConfig};
use crate::generative::fiwgan::discriminator::Discriminator;
use crate::generative::fiwgan::generator::Generator;
use crate::generative::fiwgan::loss::GanLoss;
use crate::generative::fiwgan::network::Network;
use crate::generative::fiwgan::q_network::QNetwork;
use crate::optim::Optimizer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Everything that changes while a run trains
///
/// The three networks own disjoint parameter sets. D's parameters are read by
/// every scoring call of a step and only written when updates are applied.
pub struct TrainingState {
    /// Completed steps
    pub step: u64,
    pub generator: Generator,
    pub discriminator: Discriminator,
    pub q_network: QNetwork,
    /// Running loss statistics
    pub stats: GanStats,
    pub(super) loss: GanLoss,
    pub(super) geometry: BatchGeometry,
    pub(super) num_categ: usize,
    pub(super) g_opt: Box<dyn Optimizer>,
    pub(super) d_opt: Box<dyn Optimizer>,
    /// Optimizes G ∪ Q; present only when Q is trained
    pub(super) q_opt: Option<Box<dyn Optimizer>>,
    pub(super) ctx: Context,
    pub(super) rng: StdRng,
    seed: u64,
}

impl TrainingState {
    /// Build fresh networks and optimizers for a run.
    ///
    /// Fails with `NotImplemented` for an unknown loss name and with
    /// `ConfigError` for an impossible latent split or slice length.
    pub fn new(model: &ModelConfig, geometry: BatchGeometry, seed: Option<u64>) -> Result<Self> {
        let loss: GanLoss = model.loss.parse()?;
        if model.num_categ > model.latent_dim {
            return Err(Error::ConfigError(format!(
                "num_categ ({}) must not exceed latent_dim ({})",
                model.num_categ, model.latent_dim
            )));
        }
        if geometry.batch_size == 0 || geometry.num_channels == 0 {
            return Err(Error::ConfigError(format!(
                "batch_size and num_channels must be positive, got {geometry:?}"
            )));
        }

        let seed = seed.unwrap_or_else(|| rand::rng().random());
        let (slice_len, channels) = (geometry.slice_len, geometry.num_channels);
        let generator = Generator::with_seed(model.generator(slice_len, channels), seed)?;
        let discriminator = Discriminator::with_seed(
            model.discriminator(slice_len, channels),
            loss.score_activation(),
            seed.wrapping_add(1),
        )?;
        let q_network = QNetwork::with_seed(
            model.discriminator(slice_len, channels),
            model.num_categ,
            seed.wrapping_add(2),
        )?;

        let plan = loss.optimizers();
        tracing::info!(
            loss = %loss,
            generator_params = generator.num_parameters(),
            discriminator_params = discriminator.num_parameters(),
            q_params = q_network.num_parameters(),
            g_optimizer = plan.generator.name(),
            d_optimizer = plan.discriminator.name(),
            seed,
            "Built fiwGAN training state"
        );

        Ok(Self {
            step: 0,
            generator,
            discriminator,
            q_network,
            stats: GanStats::default(),
            loss,
            geometry,
            num_categ: model.num_categ,
            g_opt: plan.generator.build(),
            d_opt: plan.discriminator.build(),
            q_opt: plan.q.map(|spec| spec.build()),
            ctx: Context::with_seed(seed.wrapping_add(3)),
            rng: StdRng::seed_from_u64(seed.wrapping_add(4)),
            seed,
        })
    }

    /// GAN objective of the run
    pub fn loss(&self) -> GanLoss {
        self.loss
    }

    /// Shape every real batch must have
    pub fn geometry(&self) -> BatchGeometry {
        self.geometry
    }

    /// Seed all random sources were derived from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Forward-pass context (training mode, phase shuffle randomness)
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Latent dimension G consumes
    pub fn latent_dim(&self) -> usize {
        self.generator.config.latent_dim
    }

    /// Number of code features at the front of the latent
    pub fn num_categ(&self) -> usize {
        self.num_categ
    }

    /// Total trainable parameters across G, D and Q
    #[must_use]
    pub fn num_parameters(&self) -> usize {
        self.generator.num_parameters()
            + self.discriminator.num_parameters()
            + self.q_network.num_parameters()
    }

    pub(super) fn check_batch_shape(&self, shape: &[usize]) -> Result<()> {
        let expected = self.geometry.shape();
        if shape != expected {
            return Err(Error::ShapeMismatch { expected: expected.to_vec(), actual: shape.to_vec() });
        }
        Ok(())
    }
}
