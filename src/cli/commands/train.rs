//! Train command implementation

use crate::cli::logging::{enabled, log};
use crate::cli::LogLevel;
use crate::config::{apply_overrides, load_config_unchecked, train_from_config, validate_config, TrainArgs};
use crate::train::ProgressCallback;

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    log(level, LogLevel::Normal, &format!("fiwgan: Training from {}", args.config.display()));

    let mut config = load_config_unchecked(&args.config).map_err(|e| format!("Config error: {e}"))?;
    apply_overrides(&mut config, &args);
    validate_config(&config).map_err(|e| format!("Config error: {}", crate::Error::from(e)))?;

    log(level, LogLevel::Verbose, &format!("  Data: {}", config.data.dir.display()));
    log(level, LogLevel::Verbose, &format!("  Loss: {}", config.model.loss));
    log(
        level,
        LogLevel::Verbose,
        &format!("  Batch: {} x {} x {}", config.train.batch_size, config.data.slice_len, config.data.num_channels),
    );
    log(level, LogLevel::Verbose, &format!("  Epochs: {}", config.train.epochs));

    if args.dry_run {
        log(level, LogLevel::Normal, "Dry run - config validated successfully");
        return Ok(());
    }

    let progress = enabled(level, LogLevel::Normal).then(|| ProgressCallback::new(config.train.log_interval));
    let result = train_from_config(config, progress).map_err(|e| format!("Training error: {e}"))?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Training complete: {} epochs, {} steps ({:.1}s)",
            result.epochs_completed, result.global_step, result.elapsed_secs
        ),
    );
    Ok(())
}
