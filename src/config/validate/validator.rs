//! Configuration validation logic

use super::error::ValidationError;
use crate::config::schema::FiwganConfig;
use crate::generative::{max_phaseshuffle_rad, GanLoss, SUPPORTED_SLICE_LENS};
use std::path::{Component, Path};

/// Validate a run configuration
///
/// Checks:
/// - The loss variant is known
/// - Slice length, channel count and sample rate are supported
/// - The latent vector has room for the code
/// - Phase shuffle stays shorter than every shuffled signal
/// - Numeric settings are in range
pub fn validate_config(config: &FiwganConfig) -> Result<(), ValidationError> {
    let (data, model, train) = (&config.data, &config.model, &config.train);

    if model.loss.parse::<GanLoss>().is_err() {
        return Err(ValidationError::UnknownLoss(model.loss.clone()));
    }

    if !SUPPORTED_SLICE_LENS.contains(&data.slice_len) {
        return Err(ValidationError::UnsupportedSliceLen(data.slice_len));
    }
    if !(1..=2).contains(&data.num_channels) {
        return Err(ValidationError::InvalidChannels(data.num_channels));
    }
    if data.sample_rate == 0 {
        return Err(ValidationError::InvalidSampleRate(data.sample_rate));
    }
    // NaN fails this range check too
    if !(0.0..1.0).contains(&data.overlap_ratio) {
        return Err(ValidationError::InvalidOverlap(data.overlap_ratio));
    }

    if model.latent_dim == 0 {
        return Err(ValidationError::InvalidLatentDim(model.latent_dim));
    }
    if model.num_categ > model.latent_dim {
        return Err(ValidationError::CodeExceedsLatent {
            num_categ: model.num_categ,
            latent_dim: model.latent_dim,
        });
    }
    if model.kernel_len == 0 {
        return Err(ValidationError::InvalidKernelLen(model.kernel_len));
    }
    if model.dim == 0 {
        return Err(ValidationError::InvalidDim(model.dim));
    }
    let max_rad = max_phaseshuffle_rad(data.slice_len);
    if model.phaseshuffle_rad > max_rad {
        return Err(ValidationError::PhaseShuffleTooLarge {
            rad: model.phaseshuffle_rad,
            slice_len: data.slice_len,
            max: max_rad,
        });
    }
    if model.post_proc_filter && model.post_proc_len == 0 {
        return Err(ValidationError::InvalidPostProcLen(model.post_proc_len));
    }

    if train.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(train.batch_size));
    }
    if train.epochs == 0 {
        return Err(ValidationError::InvalidEpochs(train.epochs));
    }
    if train.log_interval == 0 {
        return Err(ValidationError::InvalidLogInterval(train.log_interval));
    }
    if let Some(job_id) = &train.job_id {
        let mut components = Path::new(job_id).components();
        let single = matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none();
        if !single {
            return Err(ValidationError::InvalidJobId(job_id.clone()));
        }
    }

    Ok(())
}
