//! Batches decoded from a directory of WAV files

use super::slicing::{slice_audio, SliceOptions};
use super::source::BatchSource;
use super::wav::{convert_channels, peak_normalize, read_wav};
use crate::train::AudioBatch;
use crate::{Error, Result};
use ndarray::{stack, Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// File extensions picked up from the data directory
pub const AUDIO_EXTENSIONS: [&str; 1] = ["wav"];

/// How files are decoded before slicing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeOptions {
    /// Required sample rate; files at other rates are skipped
    pub sample_rate: u32,
    pub num_channels: usize,
    /// Peak-normalize each file
    pub normalize: bool,
}

/// Shuffles the files each epoch into groups of `batch_size` and turns each
/// group into one batch.
///
/// Files left over after the last full group are not used that epoch. Each
/// batch is filled with the first `batch_size` slices of its group, in file
/// order.
pub struct WavDirectorySource {
    files: Vec<PathBuf>,
    batch_size: usize,
    decode: DecodeOptions,
    slicing: SliceOptions,
    rng: StdRng,
    schedule: VecDeque<Vec<PathBuf>>,
}

impl WavDirectorySource {
    /// Discover audio files in `dir` (not recursive).
    ///
    /// Fails if the directory holds fewer files than one batch needs.
    pub fn new(
        dir: impl AsRef<Path>,
        batch_size: usize,
        decode: DecodeOptions,
        slicing: SliceOptions,
        seed: u64,
    ) -> Result<Self> {
        let dir = dir.as_ref();
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_audio_file(path))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(Error::ConfigError(format!("no audio files found in {}", dir.display())));
        }
        if batch_size == 0 || files.len() < batch_size {
            return Err(Error::ConfigError(format!(
                "{} audio files in {} cannot fill a batch of {batch_size}",
                files.len(),
                dir.display()
            )));
        }
        tracing::info!(files = files.len(), dir = %dir.display(), "Discovered audio files");

        let mut source = Self {
            files,
            batch_size,
            decode,
            slicing,
            rng: StdRng::seed_from_u64(seed),
            schedule: VecDeque::new(),
        };
        source.reset()?;
        Ok(source)
    }

    /// Every discovered file, sorted
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    fn load_slices(&mut self, path: &Path) -> Result<Vec<Array2<f32>>> {
        let decoded = read_wav(path)?;
        if decoded.sample_rate != self.decode.sample_rate {
            tracing::warn!(
                path = %path.display(),
                found = decoded.sample_rate,
                expected = self.decode.sample_rate,
                "Skipping file with mismatched sample rate"
            );
            return Ok(Vec::new());
        }
        let mut samples = convert_channels(decoded.samples, self.decode.num_channels)?;
        if self.decode.normalize {
            peak_normalize(&mut samples);
        }
        Ok(slice_audio(samples.view(), &self.slicing, &mut self.rng))
    }
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| AUDIO_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}

impl BatchSource for WavDirectorySource {
    fn next_batch(&mut self) -> Result<AudioBatch> {
        let group = self.schedule.pop_front().ok_or(Error::EndOfData)?;
        let mut slices = Vec::with_capacity(self.batch_size);
        for path in &group {
            if slices.len() >= self.batch_size {
                break;
            }
            slices.extend(self.load_slices(path)?);
        }
        slices.truncate(self.batch_size);

        if slices.len() < self.batch_size {
            return Err(Error::ShapeMismatch {
                expected: vec![self.batch_size, self.slicing.slice_len, self.decode.num_channels],
                actual: vec![slices.len(), self.slicing.slice_len, self.decode.num_channels],
            });
        }
        let views: Vec<ArrayView2<'_, f32>> = slices.iter().map(Array2::view).collect();
        let batch = stack(Axis(0), &views).map_err(|e| Error::Audio(format!("cannot stack slices: {e}")))?;
        Ok(AudioBatch::new(batch))
    }

    fn reset(&mut self) -> Result<()> {
        let mut order = self.files.clone();
        order.shuffle(&mut self.rng);
        self.schedule = order.chunks_exact(self.batch_size).map(<[PathBuf]>::to_vec).collect();
        Ok(())
    }

    fn batches_per_epoch(&self) -> Option<usize> {
        Some(self.files.len() / self.batch_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::write_wav;
    use tempfile::TempDir;

    fn decode() -> DecodeOptions {
        DecodeOptions { sample_rate: 16000, num_channels: 1, normalize: false }
    }

    fn first_slices(len: usize) -> SliceOptions {
        SliceOptions::for_training(len, true, 0.0, false)
    }

    fn write_tone(dir: &Path, name: &str, frames: usize, rate: u32) {
        let audio = Array2::from_shape_fn((frames, 1), |(t, _)| (t as f32 * 0.01).sin() * 0.5);
        write_wav(dir.join(name), audio.view(), rate).expect("write");
    }

    #[test]
    fn test_empty_directory_is_fatal() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("notes.txt"), "not audio").expect("write");
        let err = WavDirectorySource::new(dir.path(), 1, decode(), first_slices(64), 0).err();
        assert!(matches!(err, Some(Error::ConfigError(_))));
    }

    #[test]
    fn test_batches_and_end_of_epoch() {
        let dir = TempDir::new().expect("temp dir");
        for i in 0..5 {
            write_tone(dir.path(), &format!("{i}.wav"), 100, 16000);
        }
        let mut source = WavDirectorySource::new(dir.path(), 2, decode(), first_slices(64), 3).expect("source");
        assert_eq!(source.batches_per_epoch(), Some(2));
        assert_eq!(source.next_batch().expect("batch").audio().dim(), (2, 64, 1));
        assert!(source.next_batch().is_ok());
        assert!(source.next_batch().unwrap_err().is_end_of_data());
        source.reset().expect("reset");
        assert!(source.next_batch().is_ok());
    }

    #[test]
    fn test_mismatched_rate_skipped_then_batch_short() {
        let dir = TempDir::new().expect("temp dir");
        write_tone(dir.path(), "a.wav", 100, 16000);
        write_tone(dir.path(), "b.WAV", 100, 44100);
        let mut source = WavDirectorySource::new(dir.path(), 2, decode(), first_slices(64), 0).expect("source");
        assert_eq!(source.files().len(), 2);
        let err = source.next_batch().unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_long_file_fills_batch_alone() {
        let dir = TempDir::new().expect("temp dir");
        write_tone(dir.path(), "long.wav", 1000, 16000);
        let slicing = SliceOptions { slice_len: 100, first_slice: false, overlap_ratio: 0.0, pad_end: false, randomize_offset: false };
        let mut source = WavDirectorySource::new(dir.path(), 1, decode(), slicing, 0).expect("source");
        assert_eq!(source.next_batch().expect("batch").size(), 1);
    }
}
