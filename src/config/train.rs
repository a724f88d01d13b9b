//! Main entry points for YAML-based training

use super::schema::FiwganConfig;
use super::validate::validate_config;
use crate::data::{Prefetcher, WavDirectorySource};
use crate::generative::{Generator, Network, TrainingState};
use crate::io::{load_network, snapshot_path};
use crate::summary::FileSummaryWriter;
use crate::train::{GanTrainer, ProgressCallback, TrainOptions, TrainResult};
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the resolved configuration inside a run directory
pub const CONFIG_FILE: &str = "config.yaml";

/// Read and parse a config without validating it.
///
/// A relative `data.dir` is resolved against the config file's directory.
pub fn load_config_unchecked<P: AsRef<Path>>(path: P) -> Result<FiwganConfig> {
    let path = path.as_ref();
    let yaml = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file {}: {e}", path.display())))?;
    let mut config = FiwganConfig::from_yaml(&yaml)?;
    if let Some(base) = path.parent() {
        config.resolve_paths(base);
    }
    Ok(config)
}

/// Read, parse and validate a config
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FiwganConfig> {
    let config = load_config_unchecked(path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Fix the job id and seed, create `train_dir/job_id` and write the resolved
/// config into it.
///
/// Writing into an existing run directory overwrites its config and, later,
/// its snapshots.
pub fn prepare_run_dir(config: &mut FiwganConfig) -> Result<PathBuf> {
    if config.train.job_id.is_none() {
        config.train.job_id = Some(chrono::Utc::now().format("%Y%m%d-%H%M%S").to_string());
    }
    if config.train.seed.is_none() {
        config.train.seed = Some(rand::random());
    }
    let run_dir = config.run_dir().ok_or_else(|| Error::ConfigError("job id is unset".to_string()))?;
    fs::create_dir_all(&run_dir)?;
    fs::write(run_dir.join(CONFIG_FILE), config.to_yaml()?)?;
    tracing::info!(run_dir = %run_dir.display(), "Prepared run directory");
    Ok(run_dir)
}

/// WAV directory source behind a prefetch queue
pub fn build_source(config: &FiwganConfig) -> Result<Prefetcher<WavDirectorySource>> {
    let seed = config.train.seed.unwrap_or_else(rand::random);
    let source = WavDirectorySource::new(
        &config.data.dir,
        config.train.batch_size,
        config.decode_options(),
        config.slice_options(),
        seed,
    )?;
    Ok(Prefetcher::new(source, config.data.prefetch))
}

/// Validate, prepare the run directory and train.
///
/// Summaries go to the run directory (`scalars.jsonl`, `audio/`), next to
/// the per-epoch snapshots.
pub fn train_from_config(mut config: FiwganConfig, progress: Option<ProgressCallback>) -> Result<TrainResult> {
    validate_config(&config)?;
    let run_dir = prepare_run_dir(&mut config)?;
    let mut source = build_source(&config)?;

    let state = TrainingState::new(&config.model, config.geometry(), config.train.seed)?;
    let options = TrainOptions::new(config.train.epochs, config.data.sample_rate).with_run_dir(&run_dir);
    let mut trainer = GanTrainer::new(state, options);
    trainer.set_summary_writer(Box::new(FileSummaryWriter::new(&run_dir)?));
    if let Some(progress) = progress {
        trainer.add_callback(progress);
    }
    trainer.train(&mut source)
}

/// Train from a YAML configuration file
///
/// ```no_run
/// use fiwgan::config::train_from_yaml;
///
/// let result = train_from_yaml("config.yaml")?;
/// println!("{} steps", result.global_step);
/// # Ok::<(), fiwgan::Error>(())
/// ```
pub fn train_from_yaml<P: AsRef<Path>>(config_path: P) -> Result<TrainResult> {
    let config = load_config(config_path)?;
    let interval = config.train.log_interval;
    train_from_config(config, Some(ProgressCallback::new(interval)))
}

/// Rebuild the generator of a finished run from its config and snapshot
pub fn restore_generator<P: AsRef<Path>>(run_dir: P) -> Result<(FiwganConfig, Generator)> {
    let run_dir = run_dir.as_ref();
    let config = load_config(run_dir.join(CONFIG_FILE))?;
    let generator = Generator::with_seed(config.model.generator(config.data.slice_len, config.data.num_channels), 0)?;
    let metadata = load_network(&generator, snapshot_path(run_dir, generator.name()))?;
    tracing::info!(step = metadata.step, created = %metadata.created, "Restored generator");
    Ok((config, generator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_resolves_data_dir() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("run.yaml");
        fs::write(&path, "data:\n  dir: clips\n").expect("write");
        let config = load_config(&path).expect("load");
        assert_eq!(config.data.dir, dir.path().join("clips"));
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "model:\n  loss: hinge\n").expect("write");
        assert!(matches!(load_config(&path), Err(Error::NotImplemented(_))));
        assert!(load_config_unchecked(&path).is_ok());
    }

    #[test]
    fn test_missing_config_is_config_error() {
        assert!(matches!(load_config("/nonexistent/fiwgan.yaml"), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_prepare_run_dir_writes_resolved_config() {
        let dir = TempDir::new().expect("temp dir");
        let mut config = FiwganConfig::default();
        config.train.train_dir = dir.path().to_path_buf();
        let run_dir = prepare_run_dir(&mut config).expect("prepare");

        assert!(config.train.job_id.is_some());
        assert!(config.train.seed.is_some());
        let saved = FiwganConfig::from_yaml(&fs::read_to_string(run_dir.join(CONFIG_FILE)).expect("read"))
            .expect("parse");
        assert_eq!(saved, config);
    }

    #[test]
    fn test_missing_data_dir_fails_before_training() {
        let dir = TempDir::new().expect("temp dir");
        let mut config = FiwganConfig::default();
        config.train.train_dir = dir.path().join("train");
        config.data.dir = dir.path().join("no-audio-here");
        assert!(train_from_config(config, None).is_err());
    }
}
