//! Core CLI types - Cli, Command, and argument structs

use crate::config::FiwganConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::types::OutputFormat;

/// fiwgan: featural InfoWaveGAN training for raw audio
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "fiwgan")]
#[command(version)]
#[command(about = "Train and sample fiwGAN audio generators")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Train from a YAML configuration
    Train(TrainArgs),

    /// Validate a configuration file without training
    Validate(ValidateArgs),

    /// Display the resolved configuration
    Info(InfoArgs),

    /// Render audio from a trained generator
    Generate(GenerateArgs),
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Override the directory holding run directories
    #[arg(short = 'o', long)]
    pub train_dir: Option<PathBuf>,

    /// Override the run name
    #[arg(short, long)]
    pub job_id: Option<String>,

    /// Override the audio directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Override number of epochs
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Override batch size
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Override the loss variant (dcgan, lsgan, wgan, wgan-gp)
    #[arg(short, long)]
    pub loss: Option<String>,

    /// Dry run (validate config but don't train)
    #[arg(long)]
    pub dry_run: bool,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Show detailed validation report
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InfoArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output format (text, json, yaml)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the generate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct GenerateArgs {
    /// Run directory holding config.yaml and generator.safetensors
    #[arg(short, long)]
    pub run_dir: PathBuf,

    /// Directory the WAV files are written to
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of clips to render
    #[arg(short = 'n', long, default_value_t = 1)]
    pub num: usize,

    /// Random seed for the latent vectors
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Apply command-line overrides to a run configuration
pub fn apply_overrides(config: &mut FiwganConfig, args: &TrainArgs) {
    if let Some(train_dir) = &args.train_dir {
        config.train.train_dir = train_dir.clone();
    }
    if let Some(job_id) = &args.job_id {
        config.train.job_id = Some(job_id.clone());
    }
    if let Some(data_dir) = &args.data_dir {
        config.data.dir = data_dir.clone();
    }
    if let Some(epochs) = args.epochs {
        config.train.epochs = epochs;
    }
    if let Some(batch_size) = args.batch_size {
        config.train.batch_size = batch_size;
    }
    if let Some(loss) = &args.loss {
        config.model.loss = loss.clone();
    }
    if let Some(seed) = args.seed {
        config.train.seed = Some(seed);
    }
}
