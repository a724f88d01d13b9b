//! Run configuration
//!
//! A YAML file with `data`, `model` and `train` sections, validated once at
//! startup. Command-line overrides are applied on top before validation. The
//! resolved configuration is written into the run directory, where
//! `fiwgan generate` picks it up again.

mod cli;
mod schema;
mod train;
mod validate;

pub use cli::{
    apply_overrides, parse_args, Cli, Command, GenerateArgs, InfoArgs, OutputFormat, TrainArgs,
    ValidateArgs,
};
pub use schema::{DataSpec, FiwganConfig, TrainingSpec};
pub use train::{
    build_source, load_config, load_config_unchecked, prepare_run_dir, restore_generator,
    train_from_config, train_from_yaml, CONFIG_FILE,
};
pub use validate::{validate_config, ValidationError};
