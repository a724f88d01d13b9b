//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! fiwgan train config.yaml
//! fiwgan train config.yaml --job-id speech01 --epochs 20 --seed 7
//! fiwgan validate config.yaml --detailed
//! fiwgan info config.yaml --format yaml
//! fiwgan generate --run-dir train/speech01 --output samples -n 8
//! ```

mod core;
mod types;

#[cfg(test)]
mod tests;

pub use core::{apply_overrides, parse_args, Cli, Command, GenerateArgs, InfoArgs, TrainArgs, ValidateArgs};
pub use types::OutputFormat;
