//! In-memory summary writer

use super::traits::SummaryWriter;
use crate::Result;
use ndarray::Array3;
use std::sync::{Arc, Mutex, MutexGuard};

/// An audio summary kept by [`MemorySummaryWriter`]
#[derive(Debug, Clone)]
pub struct AudioRecord {
    pub name: String,
    pub audio: Array3<f32>,
    pub sample_rate: u32,
    pub step: u64,
}

#[derive(Debug, Default)]
struct Records {
    scalars: Vec<(String, f32, u64)>,
    audio: Vec<AudioRecord>,
}

/// Keeps every summary in memory.
///
/// Clones share the same records, so a handle kept outside the trainer sees
/// what the trainer wrote.
#[derive(Debug, Clone, Default)]
pub struct MemorySummaryWriter {
    records: Arc<Mutex<Records>>,
}

impl MemorySummaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// All scalars as `(name, value, step)` in write order
    pub fn scalars(&self) -> Vec<(String, f32, u64)> {
        self.lock().scalars.clone()
    }

    /// Values recorded under `name`, in write order
    pub fn scalar_series(&self, name: &str) -> Vec<(u64, f32)> {
        self.lock().scalars.iter().filter(|(n, _, _)| n == name).map(|(_, v, s)| (*s, *v)).collect()
    }

    pub fn audio_records(&self) -> Vec<AudioRecord> {
        self.lock().audio.clone()
    }
}

impl SummaryWriter for MemorySummaryWriter {
    fn scalar(&mut self, name: &str, value: f32, step: u64) -> Result<()> {
        self.lock().scalars.push((name.to_string(), value, step));
        Ok(())
    }

    fn audio(&mut self, name: &str, audio: &Array3<f32>, sample_rate: u32, step: u64) -> Result<()> {
        self.lock().audio.push(AudioRecord { name: name.to_string(), audio: audio.clone(), sample_rate, step });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_records() {
        let handle = MemorySummaryWriter::new();
        let mut writer = handle.clone();
        writer.scalar("Generator_loss", 0.5, 3).expect("scalar");
        writer.scalar("Discriminator_loss", -1.0, 3).expect("scalar");
        writer.scalar("Generator_loss", 0.25, 4).expect("scalar");
        assert_eq!(handle.scalars().len(), 3);
        assert_eq!(handle.scalar_series("Generator_loss"), vec![(3, 0.5), (4, 0.25)]);
    }

    #[test]
    fn test_audio_kept_with_rate() {
        let mut writer = MemorySummaryWriter::new();
        writer.audio("G_Audio_9", &Array3::zeros((2, 8, 1)), 16000, 9).expect("audio");
        let records = writer.audio_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sample_rate, 16000);
        assert_eq!(records[0].audio.dim(), (2, 8, 1));
    }
}
