//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, FiwganConfig, ValidateArgs};
use crate::generative::GanLoss;

/// Format data configuration as a string
pub fn format_data_info(config: &FiwganConfig) -> String {
    let data = &config.data;
    let mut lines = vec![
        format!("  Audio directory: {}", data.dir.display()),
        format!("  Sample rate: {} Hz", data.sample_rate),
        format!("  Slice: {} samples x {} channel(s)", data.slice_len, data.num_channels),
    ];
    if data.first_slice {
        lines.push("  First slice only (zero-padded)".to_string());
    } else {
        lines.push(format!("  Overlap: {}, pad end: {}", data.overlap_ratio, data.pad_end));
    }
    if data.normalize {
        lines.push("  Peak normalization".to_string());
    }
    lines.join("\n")
}

/// Format model configuration as a string
pub fn format_model_info(config: &FiwganConfig) -> String {
    let model = &config.model;
    let mut lines = vec![
        format!("  Latent: {} ({} code + {} uniform)", model.latent_dim, model.num_categ, model.continuous_dim()),
        format!("  Kernel length: {}, dim: {}", model.kernel_len, model.dim),
        format!("  Upsampling: {:?}, phase shuffle: {}", model.upsample, model.phaseshuffle_rad),
    ];
    if model.use_batchnorm {
        lines.push("  Batch normalization".to_string());
    }
    if model.post_proc_filter {
        lines.push(format!("  Post-processing filter: {}", model.post_proc_len));
    }
    lines.join("\n")
}

/// Format the loss variant and its optimizers as a string
pub fn format_loss_info(config: &FiwganConfig) -> String {
    match config.model.loss.parse::<GanLoss>() {
        Ok(loss) => {
            let plan = loss.optimizers();
            let mut lines = vec![
                format!("  Loss: {loss}"),
                format!("  Generator optimizer: {}", plan.generator),
                format!("  Discriminator optimizer: {}", plan.discriminator),
            ];
            if let Some(q) = plan.q {
                lines.push(format!("  Q optimizer: {q}"));
            }
            lines.join("\n")
        }
        Err(_) => format!("  Loss: {} (unsupported)", config.model.loss),
    }
}

/// Format training configuration as a string
pub fn format_training_info(config: &FiwganConfig) -> String {
    let train = &config.train;
    let run = config
        .run_dir()
        .map_or_else(|| format!("{}/<timestamp>", train.train_dir.display()), |p| p.display().to_string());
    let seed = train.seed.map_or_else(|| "random".to_string(), |s| s.to_string());
    format!(
        "  Batch size: {}\n  Epochs: {}\n  Run directory: {run}\n  Seed: {seed}",
        train.batch_size, train.epochs
    )
}

/// Print detailed configuration summary
pub fn print_detailed_summary(config: &FiwganConfig) {
    println!();
    println!("Configuration Summary:");
    println!("{}", format_data_info(config));
    println!();
    println!("{}", format_model_info(config));
    println!();
    println!("{}", format_loss_info(config));
    println!();
    println!("{}", format_training_info(config));
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    log(level, LogLevel::Normal, &format!("Validating config: {}", args.config.display()));

    let config = load_config(&args.config).map_err(|e| format!("Validation failed: {e}"))?;

    log(level, LogLevel::Normal, "Configuration is valid");

    if args.detailed && level != LogLevel::Quiet {
        print_detailed_summary(&config);
    }

    Ok(())
}
