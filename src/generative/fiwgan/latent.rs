//! Latent sampling: Bernoulli code features followed by uniform noise.

use crate::Tensor;
use ndarray::{concatenate, Array2, Axis};
use rand::Rng;

/// A batch of latent vectors, split into its code and continuous parts
///
/// The concatenation order is always code first, then continuous.
#[derive(Debug, Clone, PartialEq)]
pub struct LatentBatch {
    /// (batch, num_categ), entries in {0, 1}
    pub code: Array2<f32>,
    /// (batch, latent_dim - num_categ), entries in [-1, 1]
    pub continuous: Array2<f32>,
}

impl LatentBatch {
    /// Sample each code bit from Bernoulli(0.5) and the rest from U(-1, 1)
    pub fn sample<R: Rng>(rng: &mut R, batch_size: usize, latent_dim: usize, num_categ: usize) -> Self {
        assert!(num_categ <= latent_dim, "num_categ must not exceed latent_dim");
        let code = Array2::from_shape_simple_fn((batch_size, num_categ), || {
            if rng.random_bool(0.5) {
                1.0
            } else {
                0.0
            }
        });
        let continuous = Array2::from_shape_simple_fn((batch_size, latent_dim - num_categ), || {
            rng.random_range(-1.0f32..=1.0)
        });
        Self { code, continuous }
    }

    /// Uniform-only latent over every dimension, used for inference previews
    pub fn sample_uniform<R: Rng>(rng: &mut R, batch_size: usize, latent_dim: usize) -> Array2<f32> {
        Array2::from_shape_simple_fn((batch_size, latent_dim), || rng.random_range(-1.0f32..=1.0))
    }

    /// Number of latent vectors
    pub fn batch_size(&self) -> usize {
        self.code.nrows()
    }

    /// Full latent dimension
    pub fn latent_dim(&self) -> usize {
        self.code.ncols() + self.continuous.ncols()
    }

    /// Concatenated `(batch, latent_dim)` array
    pub fn to_array(&self) -> Array2<f32> {
        concatenate(Axis(1), &[self.code.view(), self.continuous.view()])
            .expect("code and continuous parts share the batch axis")
    }

    /// Concatenated latent as a constant tensor
    pub fn to_tensor(&self) -> Tensor {
        Tensor::new(self.to_array().into_dyn(), false)
    }

    /// Code part as a constant tensor
    pub fn code_tensor(&self) -> Tensor {
        Tensor::new(self.code.clone().into_dyn(), false)
    }
}
