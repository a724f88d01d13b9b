//! File-backed summaries: JSON lines for scalars, WAV files for audio

use super::traits::SummaryWriter;
use crate::data::write_wav;
use crate::{Error, Result};
use ndarray::{s, Array2, Array3};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Scalar log inside the summary directory
pub const SCALARS_FILE: &str = "scalars.jsonl";

/// Subdirectory holding audio summaries
pub const AUDIO_DIR: &str = "audio";

/// One line of `scalars.jsonl`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarRecord {
    pub name: String,
    pub value: f32,
    pub step: u64,
    /// Seconds since the Unix epoch
    pub wall_time: f64,
}

/// Lay a batch end to end with `gap` silent frames between examples
pub fn flatten_batch(audio: &Array3<f32>, gap: usize) -> Array2<f32> {
    let (batch, frames, channels) = audio.dim();
    let total = batch * frames + batch.saturating_sub(1) * gap;
    let mut out = Array2::zeros((total, channels));
    for b in 0..batch {
        let start = b * (frames + gap);
        out.slice_mut(s![start..start + frames, ..]).assign(&audio.slice(s![b, .., ..]));
    }
    out
}

/// Writes summaries under one directory
///
/// Scalars are appended to [`SCALARS_FILE`]; each audio summary becomes
/// `audio/<name>.wav`, with a quarter second of silence between examples.
pub struct FileSummaryWriter {
    dir: PathBuf,
    scalars: BufWriter<File>,
}

impl FileSummaryWriter {
    /// Open (or create) a summary directory, appending to existing scalars
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(dir.join(AUDIO_DIR))?;
        let file = OpenOptions::new().create(true).append(true).open(dir.join(SCALARS_FILE))?;
        Ok(Self { dir, scalars: BufWriter::new(file) })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read every record back from a `scalars.jsonl`
    pub fn read_scalars(path: impl AsRef<Path>) -> Result<Vec<ScalarRecord>> {
        std::fs::read_to_string(path)?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(|e| Error::Serialization(e.to_string())))
            .collect()
    }
}

impl SummaryWriter for FileSummaryWriter {
    fn scalar(&mut self, name: &str, value: f32, step: u64) -> Result<()> {
        let record = ScalarRecord {
            name: name.to_string(),
            value,
            step,
            wall_time: chrono::Utc::now().timestamp_millis() as f64 / 1000.0,
        };
        let line = serde_json::to_string(&record).map_err(|e| Error::Serialization(e.to_string()))?;
        writeln!(self.scalars, "{line}")?;
        Ok(())
    }

    fn audio(&mut self, name: &str, audio: &Array3<f32>, sample_rate: u32, _step: u64) -> Result<()> {
        let gap = (sample_rate / 4) as usize;
        let path = self.dir.join(AUDIO_DIR).join(format!("{name}.wav"));
        write_wav(&path, flatten_batch(audio, gap).view(), sample_rate)?;
        tracing::debug!(path = %path.display(), "Wrote audio summary");
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.scalars.flush()?;
        Ok(())
    }
}

impl Drop for FileSummaryWriter {
    fn drop(&mut self) {
        let _ = self.scalars.flush();
    }
}
