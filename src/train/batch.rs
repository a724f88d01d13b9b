//! Batch of real audio

use crate::generative::BatchGeometry;
use crate::{Error, Result};
use ndarray::Array3;

/// A batch of real audio slices, `(batch, slice_len, channels)`
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBatch {
    audio: Array3<f32>,
}

impl AudioBatch {
    /// Create a new batch
    pub fn new(audio: Array3<f32>) -> Self {
        Self { audio }
    }

    /// Number of slices in the batch
    pub fn size(&self) -> usize {
        self.audio.dim().0
    }

    pub fn audio(&self) -> &Array3<f32> {
        &self.audio
    }

    pub fn into_inner(self) -> Array3<f32> {
        self.audio
    }

    /// Fail unless the batch has exactly the run's shape
    pub fn validate(&self, geometry: &BatchGeometry) -> Result<()> {
        let expected = geometry.shape();
        if self.audio.shape() != expected {
            return Err(Error::ShapeMismatch {
                expected: expected.to_vec(),
                actual: self.audio.shape().to_vec(),
            });
        }
        Ok(())
    }
}
