//! YAML schema for a training run
//!
//! Every field has a default, so a config only needs the keys it changes:
//!
//! ```yaml
//! data:
//!   dir: ./speech
//!   slice_len: 16384
//! model:
//!   loss: wgan-gp
//!   num_categ: 3
//! train:
//!   batch_size: 64
//!   epochs: 10
//! ```

use crate::data::{DecodeOptions, SliceOptions};
use crate::generative::{BatchGeometry, ModelConfig};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where audio comes from and how it is cut into slices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSpec {
    /// Directory of WAV files
    pub dir: PathBuf,
    /// Expected sample rate; other files are skipped
    pub sample_rate: u32,
    /// Samples per slice
    pub slice_len: usize,
    /// 1 (mono) or 2 (stereo)
    pub num_channels: usize,
    /// Fraction of a slice shared with the next one, in `[0, 1)`
    pub overlap_ratio: f32,
    /// Keep only the first slice of every file
    pub first_slice: bool,
    /// Zero-pad the last partial slice instead of dropping it
    pub pad_end: bool,
    /// Peak-normalize each file
    pub normalize: bool,
    /// Batches decoded ahead on a background thread
    pub prefetch: usize,
}

impl Default for DataSpec {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            sample_rate: 16000,
            slice_len: 16384,
            num_channels: 1,
            overlap_ratio: 0.0,
            first_slice: false,
            pad_end: false,
            normalize: false,
            prefetch: 2,
        }
    }
}

/// Run-level training settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSpec {
    /// Parent of all run directories
    pub train_dir: PathBuf,
    /// Run name; a timestamp is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub batch_size: usize,
    pub epochs: usize,
    /// Seed for weights, latents and data order; drawn from the OS when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Print progress every N steps
    pub log_interval: usize,
}

impl Default for TrainingSpec {
    fn default() -> Self {
        Self {
            train_dir: PathBuf::from("train"),
            job_id: None,
            batch_size: 64,
            epochs: 10,
            seed: None,
            log_interval: 10,
        }
    }
}

/// Complete run configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FiwganConfig {
    pub data: DataSpec,
    pub model: ModelConfig,
    pub train: TrainingSpec,
}

impl FiwganConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::ConfigError(format!("Failed to parse YAML config: {e}")))
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Shape every real and fake batch must have
    pub fn geometry(&self) -> BatchGeometry {
        BatchGeometry::new(self.train.batch_size, self.data.slice_len, self.data.num_channels)
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            sample_rate: self.data.sample_rate,
            num_channels: self.data.num_channels,
            normalize: self.data.normalize,
        }
    }

    pub fn slice_options(&self) -> SliceOptions {
        SliceOptions::for_training(
            self.data.slice_len,
            self.data.first_slice,
            self.data.overlap_ratio,
            self.data.pad_end,
        )
    }

    /// `train_dir/job_id`, once the job id is known
    pub fn run_dir(&self) -> Option<PathBuf> {
        self.train.job_id.as_ref().map(|id| self.train.train_dir.join(id))
    }

    /// Resolve a relative data directory against the config file's location
    pub(crate) fn resolve_paths(&mut self, base: &Path) {
        if self.data.dir.is_relative() {
            self.data.dir = base.join(&self.data.dir);
        }
    }
}
