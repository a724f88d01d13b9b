//! Summary writer trait

use crate::Result;
use ndarray::Array3;

/// Destination for scalar and audio summaries
pub trait SummaryWriter: Send {
    /// Record one scalar value at `step`
    fn scalar(&mut self, name: &str, value: f32, step: u64) -> Result<()>;

    /// Record a batch of waveforms shaped `(batch, frames, channels)`
    fn audio(&mut self, name: &str, audio: &Array3<f32>, sample_rate: u32, step: u64) -> Result<()>;

    /// Flush pending writes
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
