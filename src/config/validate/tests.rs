//! Validation tests

use super::*;
use crate::config::FiwganConfig;
use crate::Error;
use proptest::prelude::*;

#[test]
fn test_defaults_are_valid() {
    assert_eq!(validate_config(&FiwganConfig::default()), Ok(()));
}

#[test]
fn test_unknown_loss_maps_to_not_implemented() {
    let mut config = FiwganConfig::default();
    config.model.loss = "hinge".to_string();
    let err = validate_config(&config).unwrap_err();
    assert_eq!(err, ValidationError::UnknownLoss("hinge".to_string()));
    assert!(matches!(Error::from(err), Error::NotImplemented(_)));
}

#[test]
fn test_code_longer_than_latent_rejected() {
    let mut config = FiwganConfig::default();
    config.model.latent_dim = 4;
    config.model.num_categ = 5;
    let err = validate_config(&config).unwrap_err();
    assert!(matches!(err, ValidationError::CodeExceedsLatent { num_categ: 5, latent_dim: 4 }));
    assert!(matches!(Error::from(err), Error::ConfigError(_)));
}

#[test]
fn test_code_filling_whole_latent_allowed() {
    let mut config = FiwganConfig::default();
    config.model.latent_dim = 3;
    config.model.num_categ = 3;
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_unsupported_slice_len_rejected() {
    let mut config = FiwganConfig::default();
    config.data.slice_len = 8192;
    assert_eq!(validate_config(&config), Err(ValidationError::UnsupportedSliceLen(8192)));
}

#[test]
fn test_phase_shuffle_radius_bounded_by_slice_len() {
    let mut config = FiwganConfig::default();
    config.model.phaseshuffle_rad = 200;
    let err = validate_config(&config).unwrap_err();
    assert_eq!(err, ValidationError::PhaseShuffleTooLarge { rad: 200, slice_len: 16384, max: 63 });
    assert!(matches!(Error::from(err), Error::ConfigError(_)));

    config.model.phaseshuffle_rad = 63;
    assert!(validate_config(&config).is_ok());
    // Longer slices leave room for wider shifts
    config.model.phaseshuffle_rad = 200;
    config.data.slice_len = 65536;
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_channel_count_rejected() {
    let mut config = FiwganConfig::default();
    config.data.num_channels = 3;
    assert_eq!(validate_config(&config), Err(ValidationError::InvalidChannels(3)));
}

#[test]
fn test_overlap_of_one_rejected() {
    let mut config = FiwganConfig::default();
    config.data.overlap_ratio = 1.0;
    assert!(matches!(validate_config(&config), Err(ValidationError::InvalidOverlap(_))));
    config.data.overlap_ratio = f32::NAN;
    assert!(matches!(validate_config(&config), Err(ValidationError::InvalidOverlap(_))));
}

#[test]
fn test_zero_batch_and_epochs_rejected() {
    let mut config = FiwganConfig::default();
    config.train.batch_size = 0;
    assert_eq!(validate_config(&config), Err(ValidationError::InvalidBatchSize(0)));
    config.train.batch_size = 8;
    config.train.epochs = 0;
    assert_eq!(validate_config(&config), Err(ValidationError::InvalidEpochs(0)));
}

#[test]
fn test_job_id_must_be_single_component() {
    let mut config = FiwganConfig::default();
    config.train.job_id = Some("../escape".to_string());
    assert!(matches!(validate_config(&config), Err(ValidationError::InvalidJobId(_))));
    config.train.job_id = Some("run_7".to_string());
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_error_messages_are_actionable() {
    let msg = ValidationError::UnsupportedSliceLen(100).to_string();
    assert!(msg.contains("16384"));
    assert!(ValidationError::UnknownLoss("x".into()).to_string().contains("wgan-gp"));
}

proptest! {
    #[test]
    fn prop_code_split_rule(latent_dim in 1usize..200, num_categ in 0usize..200) {
        let mut config = FiwganConfig::default();
        config.model.latent_dim = latent_dim;
        config.model.num_categ = num_categ;
        prop_assert_eq!(validate_config(&config).is_ok(), num_categ <= latent_dim);
    }

    #[test]
    fn prop_overlap_range(overlap in -1.0f32..2.0) {
        let mut config = FiwganConfig::default();
        config.data.overlap_ratio = overlap;
        prop_assert_eq!(validate_config(&config).is_ok(), (0.0..1.0).contains(&overlap));
    }
}
