//! Batch source trait and the in-memory source

use crate::train::AudioBatch;
use crate::{Error, Result};
use ndarray::{Array3, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Supplier of real audio batches, scheduled per epoch
pub trait BatchSource {
    /// Next batch of the current schedule, or `EndOfData` once it is used up
    fn next_batch(&mut self) -> Result<AudioBatch>;

    /// Derive a fresh schedule for the next epoch
    fn reset(&mut self) -> Result<()>;

    /// Batches in one epoch, when known up front
    fn batches_per_epoch(&self) -> Option<usize> {
        None
    }
}

impl<S: BatchSource + ?Sized> BatchSource for Box<S> {
    fn next_batch(&mut self) -> Result<AudioBatch> {
        (**self).next_batch()
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }

    fn batches_per_epoch(&self) -> Option<usize> {
        (**self).batches_per_epoch()
    }
}

/// Serves batches from slices held in memory
///
/// Slices left over after the last full batch are dropped for the epoch.
pub struct InMemorySource {
    slices: Array3<f32>,
    batch_size: usize,
    shuffle: bool,
    rng: StdRng,
    order: Vec<usize>,
    position: usize,
}

impl InMemorySource {
    /// `slices` is `(num_slices, slice_len, channels)`
    pub fn new(slices: Array3<f32>, batch_size: usize, seed: u64) -> Result<Self> {
        if batch_size == 0 || slices.dim().0 < batch_size {
            return Err(Error::ConfigError(format!(
                "{} slices cannot fill a batch of {batch_size}",
                slices.dim().0
            )));
        }
        let order = (0..slices.dim().0).collect();
        Ok(Self { slices, batch_size, shuffle: false, rng: StdRng::seed_from_u64(seed), order, position: 0 })
    }

    /// Shuffle slice order on every reset
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }
}

impl BatchSource for InMemorySource {
    fn next_batch(&mut self) -> Result<AudioBatch> {
        let end = self.position + self.batch_size;
        if end > self.order.len() {
            return Err(Error::EndOfData);
        }
        let batch = self.slices.select(Axis(0), &self.order[self.position..end]);
        self.position = end;
        Ok(AudioBatch::new(batch))
    }

    fn reset(&mut self) -> Result<()> {
        if self.shuffle {
            self.order.shuffle(&mut self.rng);
        }
        self.position = 0;
        Ok(())
    }

    fn batches_per_epoch(&self) -> Option<usize> {
        Some(self.order.len() / self.batch_size)
    }
}
