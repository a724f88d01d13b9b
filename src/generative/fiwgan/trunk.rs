//! Strided convolution stack shared in shape by the discriminator and Q.

use super::config::{DiscriminatorConfig, SUPPORTED_SLICE_LENS};
use super::layers::Conv1d;
use super::normalization::Normalization;
use super::phase_shuffle::phase_shuffle;
use crate::autograd::{leaky_relu, reshape, Context, Tensor};
use crate::error::{Error, Result};
use rand::Rng;

/// Leaky ReLU slope used throughout the trunk
pub const LEAKY_SLOPE: f32 = 0.2;

/// Number of leading layers followed by phase shuffle
const SHUFFLED_LAYERS: usize = 4;

/// Largest phase shuffle radius the trunk supports for `slice_len`
///
/// A shift must stay shorter than the shortest shuffled signal, the output of
/// the last shuffled layer (`slice_len / 4^4` samples).
pub fn max_phaseshuffle_rad(slice_len: usize) -> usize {
    let shortest = (0..SHUFFLED_LAYERS).fold(slice_len, |len, _| len.div_ceil(4));
    shortest.saturating_sub(1)
}

struct TrunkLayer {
    conv: Conv1d,
    norm: Normalization,
}

/// Conv (stride 4) ─► norm ─► leaky relu ─► phase shuffle, repeated, then flatten
///
/// Channels double from `dim` each layer; 16384-sample slices use five
/// layers, longer slices add a sixth with `32·dim` channels. The first layer
/// is never normalized.
pub struct ConvTrunk {
    layers: Vec<TrunkLayer>,
    phaseshuffle_rad: usize,
    flat_features: usize,
}

impl ConvTrunk {
    pub fn new<R: Rng>(config: &DiscriminatorConfig, rng: &mut R) -> Result<Self> {
        if !SUPPORTED_SLICE_LENS.contains(&config.slice_len) {
            return Err(Error::ConfigError(format!(
                "discriminator slice_len {} not in {SUPPORTED_SLICE_LENS:?}",
                config.slice_len
            )));
        }
        let max_rad = max_phaseshuffle_rad(config.slice_len);
        if config.phaseshuffle_rad > max_rad {
            return Err(Error::ConfigError(format!(
                "phaseshuffle_rad {} exceeds {max_rad} for slice_len {}",
                config.phaseshuffle_rad, config.slice_len
            )));
        }
        let depth = if config.slice_len == 16384 { 5 } else { 6 };
        let mut layers = Vec::with_capacity(depth);
        let mut in_channels = config.num_channels;
        let mut len = config.slice_len;
        for i in 0..depth {
            let out_channels = config.dim << i;
            layers.push(TrunkLayer {
                conv: Conv1d::new(rng, in_channels, out_channels, config.kernel_len, 4, true),
                norm: Normalization::new(config.use_batchnorm && i > 0, out_channels),
            });
            in_channels = out_channels;
            len = len.div_ceil(4);
        }
        Ok(Self { layers, phaseshuffle_rad: config.phaseshuffle_rad, flat_features: len * in_channels })
    }

    /// `(B, slice_len, channels) -> (B, flat_features)`
    pub fn forward(&self, x: &Tensor, ctx: &Context) -> Tensor {
        let batch = x.shape()[0];
        let mut h = x.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            h = leaky_relu(&layer.norm.forward(&layer.conv.forward(&h), ctx), LEAKY_SLOPE);
            if i < SHUFFLED_LAYERS {
                h = phase_shuffle(&h, self.phaseshuffle_rad, ctx);
            }
        }
        reshape(&h, &[batch, self.flat_features])
    }

    /// Width of the flattened output
    pub fn flat_features(&self) -> usize {
        self.flat_features
    }

    pub fn named_parameters(&self) -> Vec<(String, Tensor)> {
        let mut params = Vec::new();
        for (i, layer) in self.layers.iter().enumerate() {
            params.extend(layer.conv.named_parameters(&format!("conv{i}")));
            params.extend(layer.norm.named_parameters(&format!("norm{i}")));
        }
        params
    }

    pub fn named_buffers(&self) -> Vec<(String, Tensor)> {
        self.layers
            .iter()
            .enumerate()
            .flat_map(|(i, layer)| layer.norm.named_buffers(&format!("norm{i}")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generative::fiwgan::config::ModelConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_flat_features_per_slice_len() {
        let model = ModelConfig { dim: 2, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(0);
        // 16384 / 4^5 = 16 steps of 16·dim channels
        let trunk = ConvTrunk::new(&model.discriminator(16384, 1), &mut rng).expect("build");
        assert_eq!(trunk.flat_features(), 16 * 32);
        // 32768 / 4^6 = 8 steps of 32·dim channels
        let trunk = ConvTrunk::new(&model.discriminator(32768, 1), &mut rng).expect("build");
        assert_eq!(trunk.flat_features(), 8 * 64);
        let trunk = ConvTrunk::new(&model.discriminator(65536, 2), &mut rng).expect("build");
        assert_eq!(trunk.flat_features(), 16 * 64);
    }

    #[test]
    fn test_max_phaseshuffle_rad_tracks_shortest_shuffled_signal() {
        assert_eq!(max_phaseshuffle_rad(16384), 63);
        assert_eq!(max_phaseshuffle_rad(32768), 127);
        assert_eq!(max_phaseshuffle_rad(65536), 255);
    }

    #[test]
    fn test_rejects_radius_longer_than_shuffled_signal() {
        let mut rng = StdRng::seed_from_u64(0);
        let model = ModelConfig { dim: 2, phaseshuffle_rad: 64, ..Default::default() };
        let err = ConvTrunk::new(&model.discriminator(16384, 1), &mut rng);
        assert!(matches!(err, Err(Error::ConfigError(_))));
        let model = ModelConfig { dim: 2, phaseshuffle_rad: 63, ..Default::default() };
        let trunk = ConvTrunk::new(&model.discriminator(16384, 1), &mut rng).expect("build");
        let x = Tensor::zeros(&[1, 16384, 1], false);
        assert_eq!(trunk.forward(&x, &Context::with_seed(3)).shape(), vec![1, 16 * 32]);
    }

    #[test]
    fn test_first_layer_never_normalized() {
        let model = ModelConfig { dim: 2, use_batchnorm: true, ..Default::default() };
        let trunk = ConvTrunk::new(&model.discriminator(16384, 1), &mut StdRng::seed_from_u64(0))
            .expect("build");
        let names: Vec<String> = trunk.named_parameters().into_iter().map(|(n, _)| n).collect();
        assert!(!names.iter().any(|n| n.starts_with("norm0")));
        assert!(names.iter().any(|n| n.starts_with("norm1")));
    }
}
